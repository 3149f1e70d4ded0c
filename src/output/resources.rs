//
//  gitlab-client
//  output/resources.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Table and detail views for the API models.

use super::{
    first_line, format_bool, format_state, format_time, print_field, print_header,
    print_optional_field, truncate, TableOutput, TableRow,
};
use crate::api::{Project, ProtectedTag, Release, Tag, User, Version};

impl TableRow for Tag {
    const HEADERS: &'static [&'static str] = &["Name", "Commit", "Title", "Protected", "Release"];

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            self.commit.short_id.clone(),
            truncate(&self.commit.title, 50),
            format_bool(self.protected, color),
            format_bool(self.release.is_some(), color),
        ]
    }
}

impl TableOutput for Tag {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("Commit", &self.commit.id, color);
        print_field("Title", &self.commit.title, color);
        print_optional_field("Author", self.commit.author_name.as_deref(), color);
        print_optional_field("Message", self.message.as_deref(), color);
        print_field("Protected", &format_bool(self.protected, color), color);
        print_field("Created", &format_time(self.created_at.as_ref()), color);
        if let Some(release) = &self.release {
            print_field("Release", &release.tag_name, color);
        }
    }
}

impl TableRow for ProtectedTag {
    const HEADERS: &'static [&'static str] = &["Name", "Allowed to create"];

    fn row(&self, _color: bool) -> Vec<String> {
        vec![self.name.clone(), access_levels(self)]
    }
}

impl TableOutput for ProtectedTag {
    fn print_table(&self, color: bool) {
        print_header(&self.name);
        print_field("Allowed to create", &access_levels(self), color);
    }
}

fn access_levels(tag: &ProtectedTag) -> String {
    let levels: Vec<String> = tag
        .create_access_levels
        .iter()
        .map(|level| {
            level
                .access_level_description
                .clone()
                .unwrap_or_else(|| level.access_level.to_string())
        })
        .collect();
    if levels.is_empty() {
        "-".to_string()
    } else {
        levels.join(", ")
    }
}

impl TableRow for Release {
    const HEADERS: &'static [&'static str] = &["Tag", "Name", "Released", "Author"];

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.tag_name.clone(),
            truncate(self.name.as_deref().unwrap_or("-"), 40),
            format_time(self.released_at.as_ref()),
            self.author
                .as_ref()
                .map(|a| a.username.clone())
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl TableOutput for Release {
    fn print_table(&self, color: bool) {
        print_header(self.name.as_deref().unwrap_or(&self.tag_name));
        print_field("Tag", &self.tag_name, color);
        print_field("Released", &format_time(self.released_at.as_ref()), color);
        if let Some(author) = &self.author {
            print_field("Author", &author.username, color);
        }
        if let Some(commit) = &self.commit {
            print_field("Commit", &commit.short_id, color);
        }
        if let Some(assets) = &self.assets {
            for link in &assets.links {
                print_field("Asset", &format!("{} ({})", link.name, link.url), color);
            }
        }
        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            println!();
            println!("{}", description);
        }
    }
}

impl TableRow for Project {
    const HEADERS: &'static [&'static str] = &["ID", "Path", "Visibility", "Default branch", "Last activity"];

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.path_with_namespace.clone(),
            self.visibility
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string()),
            self.default_branch.clone().unwrap_or_else(|| "-".to_string()),
            format_time(self.last_activity_at.as_ref()),
        ]
    }
}

impl TableOutput for Project {
    fn print_table(&self, color: bool) {
        print_header(&self.path_with_namespace);
        print_field("ID", &self.id.to_string(), color);
        print_optional_field("Description", self.description.as_deref().map(first_line), color);
        if let Some(visibility) = self.visibility {
            print_field("Visibility", visibility.as_str(), color);
        }
        print_optional_field("Default branch", self.default_branch.as_deref(), color);
        print_field("Web URL", &self.web_url, color);
        print_optional_field("Clone (HTTP)", self.http_url_to_repo.as_deref(), color);
        print_optional_field("Clone (SSH)", self.ssh_url_to_repo.as_deref(), color);
        print_field("Stars", &self.star_count.to_string(), color);
        print_field("Forks", &self.forks_count.to_string(), color);
        if self.archived {
            print_field("Archived", &format_bool(true, color), color);
        }
    }
}

impl TableRow for User {
    const HEADERS: &'static [&'static str] = &["ID", "Username", "Name", "State"];

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.username.clone(),
            self.name.clone(),
            format_state(self.state.as_deref().unwrap_or("-"), color),
        ]
    }
}

impl TableOutput for User {
    fn print_table(&self, color: bool) {
        print_header(&self.username);
        print_field("ID", &self.id.to_string(), color);
        print_field("Name", &self.name, color);
        if let Some(state) = &self.state {
            print_field("State", &format_state(state, color), color);
        }
        print_optional_field("Email", self.email.as_deref(), color);
        print_optional_field("Web URL", self.web_url.as_deref(), color);
        if let Some(is_admin) = self.is_admin {
            print_field("Admin", &format_bool(is_admin, color), color);
        }
        print_field("Created", &format_time(self.created_at.as_ref()), color);
    }
}

impl TableOutput for Version {
    fn print_table(&self, color: bool) {
        print_field("Version", &self.version, color);
        print_field("Revision", &self.revision, color);
    }
}
