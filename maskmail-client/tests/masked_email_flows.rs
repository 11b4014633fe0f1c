use maskmail_client::{
    Change, Error, Id, MaskedEmailState, MaskmailClient, PartialMaskedEmail,
    MASKED_EMAIL_CAPABILITY, NEW_MASKED_EMAIL,
};
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "fmu1-test-token";
const TIMEOUT: Duration = Duration::from_secs(2);

fn session_body(server: &MockServer) -> Value {
    json!({
        "capabilities": {
            "urn:ietf:params:jmap:core": {"maxCallsInRequest": 50},
            "https://www.fastmail.com/dev/maskedemail": {}
        },
        "accounts": {
            "u1": {
                "name": "user@fastmail.com",
                "isPersonal": true,
                "isReadOnly": false,
                "accountCapabilities": {"https://www.fastmail.com/dev/maskedemail": {}}
            }
        },
        "primaryAccounts": {"https://www.fastmail.com/dev/maskedemail": "u1"},
        "username": "user@fastmail.com",
        "apiUrl": format!("{}/jmap/api/", server.uri()),
        "downloadUrl": format!("{}/jmap/download/", server.uri()),
        "uploadUrl": format!("{}/jmap/upload/", server.uri()),
        "eventSourceUrl": format!("{}/jmap/event/", server.uri()),
        "state": "cyrus-1"
    })
}

fn envelope(method_name: &str, args: Value) -> Value {
    json!({
        "sessionState": "cyrus-1",
        "methodResponses": [[method_name, args, "a"]]
    })
}

fn masked(id: &str, email: &str, state: &str) -> Value {
    json!({
        "id": id,
        "email": email,
        "state": state,
        "forDomain": "example.com",
        "description": "test",
        "lastMessageAt": null,
        "createdAt": "2024-05-01T10:00:00Z",
        "createdBy": "maskmail",
        "url": null
    })
}

async fn mount_session(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/jmap/session"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(session_body(server)))
        .mount(server)
        .await;
}

async fn connect(server: &MockServer) -> MaskmailClient {
    let url = format!("{}/jmap/session", server.uri());
    MaskmailClient::connect_to(TOKEN.to_string(), &url, TIMEOUT)
        .await
        .unwrap()
}

#[tokio::test]
async fn resolve_binds_primary_masked_email_account() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    let client = connect(&server).await;
    let session = client.session();
    let primary = session.primary_account(MASKED_EMAIL_CAPABILITY).unwrap();
    assert!(session.accounts.contains_key(primary));
    assert_eq!(client.account_id().as_str(), "u1");
}

#[tokio::test]
async fn create_returns_created_address() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .and(header("content-type", "application/json; charset=utf-8"))
        .and(header("authorization", format!("Bearer {}", TOKEN).as_str()))
        .and(body_partial_json(json!({
            "using": ["urn:ietf:params:jmap:core", "https://www.fastmail.com/dev/maskedemail"],
            "methodCalls": [["MaskedEmail/set", {
                "accountId": "u1",
                "create": {
                    "new_masked_email": {
                        "state": "pending",
                        "forDomain": "example.com",
                        "description": "test"
                    }
                }
            }, "a"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/set",
            json!({
                "accountId": "u1",
                "oldState": "10",
                "newState": "11",
                "created": {
                    "new_masked_email": masked("masked-42", "bright.cloud42@fastmail.com", "pending")
                },
                "updated": null,
                "destroyed": null
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let create = PartialMaskedEmail::new()
        .state(MaskedEmailState::Pending)
        .for_domain("example.com")
        .description("test");

    match client.create(create).await.unwrap() {
        Change::Applied(created) => {
            assert_eq!(created.email, "bright.cloud42@fastmail.com");
            assert!(created.email.contains('@'));
            assert_eq!(created.state, Some(MaskedEmailState::Pending));
        }
        other => panic!("Expected created address, got {:?}", other),
    }
}

#[tokio::test]
async fn create_without_created_entry_is_not_a_crash() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/set",
            json!({
                "accountId": "u1",
                "oldState": "10",
                "newState": "10",
                "created": null,
                "updated": null,
                "destroyed": null
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let change = client
        .create(PartialMaskedEmail::new().for_domain("example.com"))
        .await
        .unwrap();
    assert_eq!(change, Change::NotReported);
}

#[tokio::test]
async fn create_rejection_is_reported_as_data() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/set",
            json!({
                "accountId": "u1",
                "oldState": "10",
                "newState": "10",
                "created": null,
                "updated": null,
                "destroyed": null,
                "notCreated": {
                    NEW_MASKED_EMAIL: {"type": "invalidProperties", "description": "bad prefix"}
                }
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    match client
        .create(PartialMaskedEmail::new().email_prefix("!!"))
        .await
        .unwrap()
    {
        Change::Rejected(err) => {
            assert_eq!(err.error_type, "invalidProperties");
            assert_eq!(err.description.as_deref(), Some("bad prefix"));
        }
        other => panic!("Expected rejection, got {:?}", other),
    }
}

#[tokio::test]
async fn get_all_returns_server_list_verbatim() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .and(body_partial_json(json!({
            "methodCalls": [["MaskedEmail/get", {"accountId": "u1", "ids": null}, "a"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/get",
            json!({
                "accountId": "u1",
                "state": "11",
                "list": [
                    masked("m3", "c@fastmail.com", "disabled"),
                    masked("m1", "a@fastmail.com", "enabled"),
                    masked("m3", "c@fastmail.com", "disabled")
                ],
                "notFound": []
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let resp = client.get(None, None).await.unwrap();
    let ids: Vec<&str> = resp.list.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["m3", "m1", "m3"]);
    assert_eq!(resp.state, "11");
}

#[tokio::test]
async fn get_with_properties_needs_required_fields() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .and(body_partial_json(json!({
            "methodCalls": [["MaskedEmail/get", {"properties": ["email", "state"]}, "a"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/get",
            json!({
                "accountId": "u1",
                "state": "11",
                "list": [{"id": "m1", "email": "a@fastmail.com", "state": "enabled"}],
                "notFound": []
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let properties = vec!["email".to_string(), "state".to_string()];
    match client.get(None, Some(properties)).await {
        Err(err) => assert!(err.is_validation(), "got {:?}", err),
        Ok(resp) => panic!("Expected validation failure, got {:?}", resp.list),
    }
}

#[tokio::test]
async fn list_filters_by_state_and_find_by_email() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/get",
            json!({
                "accountId": "u1",
                "state": "11",
                "list": [
                    masked("m1", "a@fastmail.com", "enabled"),
                    masked("m2", "b@fastmail.com", "disabled")
                ],
                "notFound": []
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let enabled = client.list(Some(MaskedEmailState::Enabled)).await.unwrap();
    assert_eq!(enabled.len(), 1);
    assert_eq!(enabled[0].email, "a@fastmail.com");

    let found = client.find("B@fastmail.com").await.unwrap().unwrap();
    assert_eq!(found.id.as_str(), "m2");
}

#[tokio::test]
async fn get_not_found_is_passed_through() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/get",
            json!({
                "accountId": "u1",
                "state": "11",
                "list": [],
                "notFound": ["gone"]
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let resp = client
        .get(Some(vec![Id::new("gone").unwrap()]), None)
        .await
        .unwrap();
    assert!(resp.list.is_empty());
    assert_eq!(resp.not_found, vec![Id::new("gone").unwrap()]);

    assert!(client.find("gone").await.unwrap().is_none());
}

#[tokio::test]
async fn set_state_sends_patch_and_reads_null_update() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .and(body_partial_json(json!({
            "methodCalls": [["MaskedEmail/set", {
                "accountId": "u1",
                "update": {"m1": {"state": "disabled"}}
            }, "a"]]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/set",
            json!({
                "accountId": "u1",
                "oldState": "11",
                "newState": "12",
                "created": null,
                "updated": {"m1": null},
                "destroyed": null
            }),
        )))
        .expect(1)
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let change = client
        .set_state(&Id::new("m1").unwrap(), MaskedEmailState::Disabled)
        .await
        .unwrap();
    assert_eq!(change, Change::Applied(None));
}

#[tokio::test]
async fn destroy_failure_is_reported() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "MaskedEmail/set",
            json!({
                "accountId": "u1",
                "oldState": "12",
                "newState": "12",
                "created": null,
                "updated": null,
                "destroyed": null,
                "notDestroyed": {"m9": {"type": "notFound"}}
            }),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    let change = client.destroy(&Id::new("m9").unwrap()).await.unwrap();
    assert!(matches!(change, Change::Rejected(ref e) if e.error_type == "notFound"));
}

#[tokio::test]
async fn discovery_timeout_is_a_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jmap/session"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(session_body(&server))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let url = format!("{}/jmap/session", server.uri());
    let result =
        MaskmailClient::connect_to(TOKEN.to_string(), &url, Duration::from_millis(50)).await;
    match result {
        Err(err) => {
            assert!(err.is_timeout(), "expected timeout, got {:?}", err);
            assert!(!err.is_validation());
        }
        Ok(_) => panic!("Expected timeout"),
    }
}

#[tokio::test]
async fn malformed_session_is_a_validation_failure() {
    let server = MockServer::start().await;
    let mut body = session_body(&server);
    body.as_object_mut().unwrap().remove("apiUrl");

    Mock::given(method("GET"))
        .and(path("/jmap/session"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(&server)
        .await;

    let url = format!("{}/jmap/session", server.uri());
    match MaskmailClient::connect_to(TOKEN.to_string(), &url, TIMEOUT).await {
        Err(err) => assert!(err.is_validation(), "got {:?}", err),
        Ok(_) => panic!("Expected validation failure"),
    }
}

#[tokio::test]
async fn unauthorized_is_a_transport_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/jmap/session"))
        .respond_with(ResponseTemplate::new(401).set_body_string("Authorization header not a valid format"))
        .mount(&server)
        .await;

    let url = format!("{}/jmap/session", server.uri());
    match MaskmailClient::connect_to("bad".to_string(), &url, TIMEOUT).await {
        Err(Error::Transport { status, .. }) => assert_eq!(status, Some(401)),
        Err(other) => panic!("Expected transport failure, got {:?}", other),
        Ok(_) => panic!("Expected transport failure"),
    }
}

#[tokio::test]
async fn method_error_is_surfaced() {
    let server = MockServer::start().await;
    mount_session(&server).await;

    Mock::given(method("POST"))
        .and(path("/jmap/api/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(envelope(
            "error",
            json!({"type": "accountReadOnly"}),
        )))
        .mount(&server)
        .await;

    let client = connect(&server).await;
    match client.get(None, None).await {
        Err(Error::Method(err)) => assert_eq!(err.error_type, "accountReadOnly"),
        other => panic!("Expected method error, got {:?}", other),
    }
}
