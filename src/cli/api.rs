//
//  gitlab-client
//  cli/api.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Direct API access command
//!
//! Sends an authenticated request to any REST v4 endpoint. Requests go
//! through the same client as every other command, so an expired OAuth2
//! token is refreshed and the request retried once.
//!
//! ## Examples
//!
//! ```bash
//! # Get a project
//! glc api /projects/gitlab-org%2Fgitlab
//!
//! # Create a tag
//! glc api -X POST /projects/42/repository/tags -F tag_name=v1.0.0 -F ref=main
//!
//! # Every page of a list endpoint, merged into one array
//! glc api /projects/42/repository/tags --paginate
//! ```

use std::fs;

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::Method;
use serde_json::Value;

use crate::api::{ApiError, HttpResponse, Query};
use crate::output::{pretty_body, write_json};

use super::{CommandContext, GlobalOptions};

#[derive(Args, Debug)]
pub struct ApiCommand {
    /// API path relative to /api/v4, e.g. /projects/42/releases
    pub endpoint: String,

    /// HTTP method
    #[arg(long, short = 'X', default_value = "GET")]
    pub method: String,

    /// Extra request header as 'Name: Value'
    #[arg(long, short = 'H', action = clap::ArgAction::Append)]
    pub header: Vec<String>,

    /// Typed body field as key=value (numbers, booleans and null are converted)
    #[arg(long, short = 'F', action = clap::ArgAction::Append)]
    pub field: Vec<String>,

    /// String body field as key=value
    #[arg(long, short = 'f', action = clap::ArgAction::Append)]
    pub raw_field: Vec<String>,

    /// Read the JSON body from a file, or '-' for stdin
    #[arg(long, conflicts_with_all = ["field", "raw_field"])]
    pub input: Option<String>,

    /// Follow pagination and print every page as one array (GET only)
    #[arg(long)]
    pub paginate: bool,

    /// Print the response status and headers
    #[arg(long, short = 'i')]
    pub include: bool,

    /// Do not print the response body
    #[arg(long)]
    pub silent: bool,
}

impl ApiCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let ctx = CommandContext::resolve(global)?;
        let result = self.execute(&ctx).await;
        ctx.finish(result)
    }

    async fn execute(&self, ctx: &CommandContext) -> Result<()> {
        let method = self.parse_method()?;
        let (path, query) = split_endpoint(&self.endpoint);

        if self.paginate {
            if method != Method::GET {
                bail!("--paginate only works with GET requests");
            }
            let items: Vec<Value> = ctx.client.get_all(&path, query).await?;
            if !self.silent {
                write_json(&items)?;
            }
            return Ok(());
        }

        let mut request = ctx.client.request(method, &path);
        request.query = query;
        for header in &self.header {
            let (name, value) = parse_header(header)?;
            request.headers.insert(name, value);
        }
        if let Some(body) = self.build_body()? {
            request = request.json(body);
        }

        match ctx.client.execute(request).await {
            Ok(response) => {
                self.print_response(&response);
                Ok(())
            }
            Err(ApiError::Http { status, body }) => {
                if self.include {
                    println!("{} {}", style("HTTP").dim(), status);
                    println!();
                }
                if !self.silent && !body.is_empty() {
                    println!("{}", pretty_body(&body));
                }
                bail!("Request failed with status {}", status)
            }
            Err(e) => Err(e.into()),
        }
    }

    fn parse_method(&self) -> Result<Method> {
        match self.method.to_uppercase().as_str() {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "PATCH" => Ok(Method::PATCH),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            _ => bail!("Unsupported HTTP method: {}", self.method),
        }
    }

    fn build_body(&self) -> Result<Option<Value>> {
        if let Some(input) = &self.input {
            let content = if input == "-" {
                let mut buffer = String::new();
                std::io::Read::read_to_string(&mut std::io::stdin(), &mut buffer)?;
                buffer
            } else {
                fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))?
            };
            let value = serde_json::from_str(&content).context("Input is not valid JSON")?;
            return Ok(Some(value));
        }

        if self.field.is_empty() && self.raw_field.is_empty() {
            return Ok(None);
        }

        let mut body = serde_json::Map::new();
        for field in &self.field {
            let (key, value) = split_field(field)?;
            set_nested_value(&mut body, key, typed_value(value));
        }
        for field in &self.raw_field {
            let (key, value) = split_field(field)?;
            set_nested_value(&mut body, key, Value::String(value.to_string()));
        }
        Ok(Some(Value::Object(body)))
    }

    fn print_response(&self, response: &HttpResponse) {
        if self.include {
            println!("{} {}", style("HTTP").dim(), response.status);
            for (name, value) in response.headers.iter() {
                println!("{}: {}", name, value.to_str().unwrap_or(""));
            }
            println!();
        }
        if !self.silent && !response.body.is_empty() {
            println!("{}", pretty_body(&response.body));
        }
    }
}

/// Splits `/path?a=1&b=2` into the path and decoded query pairs.
fn split_endpoint(endpoint: &str) -> (String, Query) {
    let endpoint = endpoint.trim();
    let endpoint = endpoint.strip_prefix("/api/v4").unwrap_or(endpoint);

    let (path, query) = match endpoint.split_once('?') {
        Some((path, query)) => (path, query),
        None => (endpoint, ""),
    };
    let path = if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    };
    let query = url::form_urlencoded::parse(query.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    (path, query)
}

fn split_field(field: &str) -> Result<(&str, &str)> {
    match field.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => bail!("Invalid field format: {}. Expected key=value", field),
    }
}

fn parse_header(header: &str) -> Result<(HeaderName, HeaderValue)> {
    let Some((name, value)) = header.split_once(':') else {
        bail!("Invalid header format: {}. Expected 'Name: Value'", header);
    };
    let name = HeaderName::from_bytes(name.trim().as_bytes())?;
    let value = HeaderValue::from_str(value.trim())?;
    Ok((name, value))
}

/// Converts `true`, `false`, `null`, numbers and JSON arrays or objects;
/// anything else stays a string.
fn typed_value(value: &str) -> Value {
    match value {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        "null" => Value::Null,
        _ => {
            if let Ok(n) = value.parse::<i64>() {
                return Value::Number(n.into());
            }
            if let Some(n) = value.parse::<f64>().ok().and_then(serde_json::Number::from_f64) {
                return Value::Number(n);
            }
            if value.starts_with('[') || value.starts_with('{') {
                if let Ok(parsed) = serde_json::from_str(value) {
                    return parsed;
                }
            }
            Value::String(value.to_string())
        }
    }
}

/// Inserts `value` at a dotted key, creating intermediate objects.
fn set_nested_value(obj: &mut serde_json::Map<String, Value>, key: &str, value: Value) {
    match key.split_once('.') {
        None => {
            obj.insert(key.to_string(), value);
        }
        Some((first, rest)) => {
            let entry = obj
                .entry(first.to_string())
                .or_insert_with(|| Value::Object(serde_json::Map::new()));
            if !entry.is_object() {
                *entry = Value::Object(serde_json::Map::new());
            }
            if let Value::Object(nested) = entry {
                set_nested_value(nested, rest, value);
            }
        }
    }
}
