//
//  gitlab-client
//  tests/endpoints.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Resource endpoints against a mock GitLab server.

use mockito::{Matcher, Server};
use serde_json::json;

use gitlab_client::api::{
    AccessLevel, ApiError, CreateProject, CreateRelease, GitLabClient, ProjectListOptions,
    SortOrder, TagListOptions, TagOrderBy, UpdateRelease, UserListOptions, Visibility,
};
use gitlab_client::auth::SecretValue;

fn tag_json(name: &str) -> serde_json::Value {
    json!({
        "name": name,
        "message": null,
        "target": "2695effb5807a22ff3d138d593fd856244e155e7",
        "commit": {
            "id": "2695effb5807a22ff3d138d593fd856244e155e7",
            "short_id": "2695effb",
            "title": "Initial commit",
            "parent_ids": []
        },
        "release": null,
        "protected": false
    })
}

fn client(server: &Server) -> GitLabClient {
    GitLabClient::with_personal_token(server.url(), "glpat-test").unwrap()
}

#[tokio::test]
async fn test_list_tags_follows_pagination() {
    let mut server = Server::new_async().await;
    let first = server
        .mock("GET", "/api/v4/projects/42/repository/tags")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("order_by".into(), "version".into()),
            Matcher::UrlEncoded("sort".into(), "desc".into()),
            Matcher::UrlEncoded("page".into(), "1".into()),
        ]))
        .with_status(200)
        .with_header("x-page", "1")
        .with_header("x-next-page", "2")
        .with_header("x-total", "3")
        .with_header("x-total-pages", "2")
        .with_body(json!([tag_json("v1.2.0"), tag_json("v1.1.0")]).to_string())
        .create_async()
        .await;
    let second = server
        .mock("GET", "/api/v4/projects/42/repository/tags")
        .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
        .with_status(200)
        .with_header("x-page", "2")
        .with_header("x-next-page", "")
        .with_body(json!([tag_json("v1.0.0")]).to_string())
        .create_async()
        .await;

    let options = TagListOptions {
        order_by: Some(TagOrderBy::Version),
        sort: Some(SortOrder::Desc),
        search: None,
    };
    let tags = client(&server).list_tags(42u64, &options).await.unwrap();

    let names: Vec<_> = tags.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, ["v1.2.0", "v1.1.0", "v1.0.0"]);
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_tags_pager_reports_total() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v4/projects/42/repository/tags")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("x-next-page", "")
        .with_header("x-total", "1")
        .with_body(json!([tag_json("v1.0.0")]).to_string())
        .create_async()
        .await;

    let client = client(&server);
    let mut pager = client.tags_pager(42u64, &TagListOptions::default());
    let page = pager.next().await.unwrap().unwrap();
    assert_eq!(page.items.len(), 1);
    assert!(!page.has_next());
    assert_eq!(pager.total_items(), Some(1));
    assert!(pager.next().await.unwrap().is_none());
}

#[tokio::test]
async fn test_get_tag_encodes_project_path_and_name() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects/group%2Fapp/repository/tags/release%2F1.0")
        .with_status(200)
        .with_body(tag_json("release/1.0").to_string())
        .create_async()
        .await;

    let tag = client(&server).get_tag("group/app", "release/1.0").await.unwrap();
    assert_eq!(tag.name, "release/1.0");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_get_optional_tag_not_found() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v4/projects/42/repository/tags/v9.9.9")
        .with_status(404)
        .with_body(r#"{"message":"404 Tag Not Found"}"#)
        .create_async()
        .await;

    let client = client(&server);
    assert!(client.get_optional_tag(42u64, "v9.9.9").await.unwrap().is_none());

    let err = client.get_tag(42u64, "v9.9.9").await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.message(), "404 Tag Not Found");
}

#[tokio::test]
async fn test_create_tag_sends_ref_and_message() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v4/projects/42/repository/tags")
        .match_header("private-token", "glpat-test")
        .match_body(Matcher::Json(json!({
            "tag_name": "v1.0.0",
            "ref": "main",
            "message": "First release"
        })))
        .with_status(201)
        .with_body(tag_json("v1.0.0").to_string())
        .create_async()
        .await;

    let tag = client(&server)
        .create_tag(42u64, "v1.0.0", "main", Some("First release"))
        .await
        .unwrap();
    assert_eq!(tag.name, "v1.0.0");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_tag_requires_name() {
    let server = Server::new_async().await;
    let err = client(&server).create_tag(42u64, " ", "main", None).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_create_tag_conflict_is_http_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/api/v4/projects/42/repository/tags")
        .with_status(400)
        .with_body(r#"{"message":"Tag v1.0.0 already exists"}"#)
        .create_async()
        .await;

    let err = client(&server)
        .create_tag(42u64, "v1.0.0", "main", None)
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
    assert_eq!(err.message(), "Tag v1.0.0 already exists");
}

#[tokio::test]
async fn test_delete_tag() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/v4/projects/42/repository/tags/v1.0.0")
        .with_status(204)
        .create_async()
        .await;

    client(&server).delete_tag(42u64, "v1.0.0").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_protect_tag_sends_numeric_access_level() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/api/v4/projects/42/protected_tags")
        .match_body(Matcher::Json(json!({
            "name": "v*",
            "create_access_level": 30
        })))
        .with_status(201)
        .with_body(
            json!({
                "name": "v*",
                "create_access_levels": [
                    {"id": 1, "access_level": 30, "access_level_description": "Developers + Maintainers"}
                ]
            })
            .to_string(),
        )
        .create_async()
        .await;

    let protected = client(&server)
        .protect_tag(42u64, "v*", AccessLevel::Developer)
        .await
        .unwrap();
    assert_eq!(protected.name, "v*");
    assert_eq!(protected.create_access_levels[0].access_level, AccessLevel::Developer);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_unprotect_tag_encodes_wildcard() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("DELETE", "/api/v4/projects/42/protected_tags/v%2A")
        .with_status(204)
        .create_async()
        .await;

    client(&server).unprotect_tag(42u64, "v*").await.unwrap();
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_and_delete_release() {
    let mut server = Server::new_async().await;
    let release = json!({
        "tag_name": "v1.0.0",
        "name": "Version 1.0",
        "description": "Notes",
        "created_at": "2024-01-03T01:55:18.203Z",
        "released_at": "2024-01-03T01:55:18.203Z"
    });
    let create = server
        .mock("POST", "/api/v4/projects/42/releases")
        .match_body(Matcher::Json(json!({
            "tag_name": "v1.0.0",
            "name": "Version 1.0",
            "description": "Notes",
            "ref": "main"
        })))
        .with_status(201)
        .with_body(release.to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/v4/projects/42/releases/v1.0.0")
        .with_status(200)
        .with_body(release.to_string())
        .create_async()
        .await;

    let client = client(&server);
    let params = CreateRelease::new("v1.0.0")
        .name("Version 1.0")
        .description("Notes")
        .git_ref("main");
    let created = client.create_release(42u64, &params).await.unwrap();
    assert_eq!(created.name.as_deref(), Some("Version 1.0"));

    let deleted = client.delete_release(42u64, "v1.0.0").await.unwrap();
    assert_eq!(deleted.tag_name, "v1.0.0");

    create.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_update_release_requires_a_field() {
    let server = Server::new_async().await;
    let err = client(&server)
        .update_release(42u64, "v1.0.0", &UpdateRelease::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_get_project_by_path() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects/diaspora%2Fdiaspora-project-site")
        .with_status(200)
        .with_body(
            json!({
                "id": 3,
                "name": "Diaspora Project Site",
                "path": "diaspora-project-site",
                "path_with_namespace": "diaspora/diaspora-project-site",
                "visibility": "private",
                "web_url": "http://example.com/diaspora/diaspora-project-site",
                "default_branch": "main"
            })
            .to_string(),
        )
        .create_async()
        .await;

    let project = client(&server)
        .get_project("diaspora/diaspora-project-site")
        .await
        .unwrap();
    assert_eq!(project.id, 3);
    assert_eq!(project.visibility, Some(Visibility::Private));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_projects_page_sends_filters() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/projects")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("owned".into(), "true".into()),
            Matcher::UrlEncoded("search".into(), "site".into()),
            Matcher::UrlEncoded("per_page".into(), "5".into()),
        ]))
        .with_status(200)
        .with_header("x-next-page", "2")
        .with_body("[]")
        .create_async()
        .await;

    let options = ProjectListOptions {
        owned: true,
        search: Some("site".to_string()),
        ..ProjectListOptions::default()
    };
    let page = client(&server).list_projects_page(&options, 1, 5).await.unwrap();
    assert!(page.items.is_empty());
    assert_eq!(page.next_page, Some(2));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_create_project_requires_name_or_path() {
    let server = Server::new_async().await;
    let err = client(&server)
        .create_project(&CreateProject::default())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_find_user_by_username() {
    let mut server = Server::new_async().await;
    let _found = server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::UrlEncoded("username".into(), "jdoe".into()))
        .with_status(200)
        .with_body(r#"[{"id":7,"username":"jdoe","name":"John Doe","state":"active"}]"#)
        .create_async()
        .await;
    let _missing = server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::UrlEncoded("username".into(), "nobody".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = client(&server);
    let user = client.find_user("jdoe").await.unwrap().unwrap();
    assert_eq!(user.id, 7);
    assert!(!user.is_blocked());
    assert!(client.find_user("nobody").await.unwrap().is_none());
}

#[tokio::test]
async fn test_list_blocked_users() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/v4/users")
        .match_query(Matcher::UrlEncoded("blocked".into(), "true".into()))
        .with_status(200)
        .with_body(r#"[{"id":9,"username":"spam","state":"blocked"}]"#)
        .create_async()
        .await;

    let options = UserListOptions {
        blocked: true,
        ..UserListOptions::default()
    };
    let users = client(&server).list_users(&options).await.unwrap();
    assert_eq!(users.len(), 1);
    assert!(users[0].is_blocked());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_block_and_hard_delete_user() {
    let mut server = Server::new_async().await;
    let block = server
        .mock("POST", "/api/v4/users/9/block")
        .with_status(201)
        .with_body("true")
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/api/v4/users/9")
        .match_query(Matcher::UrlEncoded("hard_delete".into(), "true".into()))
        .with_status(204)
        .create_async()
        .await;

    let client = client(&server);
    client.block_user(9).await.unwrap();
    client.delete_user(9, true).await.unwrap();
    block.assert_async().await;
    delete.assert_async().await;
}

#[tokio::test]
async fn test_get_version() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v4/version")
        .with_status(200)
        .with_body(r#"{"version":"16.8.1-ee","revision":"3c4a2b1"}"#)
        .create_async()
        .await;

    let version = client(&server).get_version().await.unwrap();
    assert_eq!(version.revision, "3c4a2b1");
    assert_eq!(version.major_minor(), Some((16, 8)));
}

#[tokio::test]
async fn test_oauth2_login_then_refresh_on_401() {
    let mut server = Server::new_async().await;
    let login = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::UrlEncoded("grant_type".into(), "password".into()))
        .with_status(200)
        .with_body(r#"{"access_token":"A1","token_type":"Bearer","expires_in":7200,"refresh_token":"R1","created_at":1700000000}"#)
        .create_async()
        .await;
    let refresh = server
        .mock("POST", "/oauth/token")
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
            Matcher::UrlEncoded("refresh_token".into(), "R1".into()),
        ]))
        .with_status(200)
        .with_body(r#"{"access_token":"A2","token_type":"Bearer","expires_in":7200,"refresh_token":"R2","created_at":1700007000}"#)
        .expect(1)
        .create_async()
        .await;
    let rejected = server
        .mock("GET", "/api/v4/user")
        .match_header("authorization", "Bearer A1")
        .with_status(401)
        .with_body(r#"{"message":"401 Unauthorized"}"#)
        .expect(1)
        .create_async()
        .await;
    let accepted = server
        .mock("GET", "/api/v4/user")
        .match_header("authorization", "Bearer A2")
        .with_status(200)
        .with_body(r#"{"id":1,"username":"root","name":"Administrator"}"#)
        .expect(1)
        .create_async()
        .await;

    let password = SecretValue::new("s3cret");
    let client = GitLabClient::oauth2_login(server.url(), "root", &password)
        .await
        .unwrap();
    assert_eq!(client.oauth2_token().unwrap().expires_at(), Some(1_700_007_200));

    let user = client.current_user().await.unwrap();
    assert_eq!(user.username, "root");

    let token = client.oauth2_token().unwrap();
    assert_eq!(token.access_token.reveal(), "A2");
    assert_eq!(token.refresh_token.unwrap().reveal(), "R2");

    login.assert_async().await;
    refresh.assert_async().await;
    rejected.assert_async().await;
    accepted.assert_async().await;
}
