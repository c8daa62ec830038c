use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Request};
use serde::Deserialize;

use crate::config::Config;
use crate::error::{Result, TaskError};
use crate::form::NewTask;
use crate::models::{FetchOutcome, MutationReply, TaskListDocument, TaskRow};

const FETCH_ENDPOINT: &str = "task list";
const REMOVE_ENDPOINT: &str = "remove task";

/// The three remote calls the view depends on.
#[async_trait]
pub trait TaskService: Send + Sync {
    async fn fetch_tasks(&self, employee_id: &str) -> Result<FetchOutcome>;

    async fn add_task(&self, task: &NewTask) -> Result<MutationReply>;

    async fn remove_task(&self, employee_name: &str, task_description: &str) -> Result<MutationReply>;
}

/// reqwest-backed service talking to the configured endpoints.
pub struct HttpTaskService {
    client: Client,
    fetch_url: String,
    add_url: String,
    remove_url: String,
}

impl HttpTaskService {
    pub fn new(config: &Config) -> Self {
        HttpTaskService {
            client: Client::new(),
            fetch_url: config.fetch_url.clone(),
            add_url: config.add_url.clone(),
            remove_url: config.remove_url.clone(),
        }
    }

    fn fetch_request(&self, employee_id: &str) -> Result<Request> {
        Ok(self
            .client
            .get(&self.fetch_url)
            .query(&[("EmployeeID", employee_id)])
            .build()?)
    }

    fn add_request(&self, task: &NewTask) -> Result<Request> {
        Ok(self.client.post(&self.add_url).form(&task.form_pairs()).build()?)
    }

    fn remove_request(&self, employee_name: &str, task_description: &str) -> Result<Request> {
        Ok(self
            .client
            .delete(&self.remove_url)
            .header(CONTENT_TYPE, "text/plain")
            .body(delete_body(employee_name, task_description)?)
            .build()?)
    }
}

#[async_trait]
impl TaskService for HttpTaskService {
    async fn fetch_tasks(&self, employee_id: &str) -> Result<FetchOutcome> {
        let request = self.fetch_request(employee_id)?;
        log::debug!("GET {}", request.url());
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Network {
                endpoint: FETCH_ENDPOINT,
                status,
            });
        }

        let is_json = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("application/json"));
        let body = response.text().await?;
        Ok(decode_task_list(&body, is_json))
    }

    async fn add_task(&self, task: &NewTask) -> Result<MutationReply> {
        let request = self.add_request(task)?;
        log::debug!("POST {}", request.url());
        // The add endpoint reports failures in its JSON body, so the status is not checked.
        let response = self.client.execute(request).await?;
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    async fn remove_task(&self, employee_name: &str, task_description: &str) -> Result<MutationReply> {
        let request = self.remove_request(employee_name, task_description)?;
        log::debug!("DELETE {}", request.url());
        let response = self.client.execute(request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TaskError::Network {
                endpoint: REMOVE_ENDPOINT,
                status,
            });
        }

        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }
}

/// Plain-text delete body `name,description`. The server splits on the first
/// comma, so a comma inside either field cannot be sent unambiguously.
pub fn delete_body(employee_name: &str, task_description: &str) -> Result<String> {
    if employee_name.contains(',') || task_description.contains(',') {
        return Err(TaskError::AmbiguousDelete);
    }
    Ok(format!("{employee_name},{task_description}"))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonTaskList {
    Records(Vec<TaskRow>),
    Markup(String),
}

/// Turns a successful fetch body into the stored document.
///
/// JSON bodies may be a record array or a string wrapping the markup. A body
/// labelled JSON that does not decode is kept as markup.
pub fn decode_task_list(body: &str, is_json: bool) -> FetchOutcome {
    let document = if is_json {
        match serde_json::from_str::<JsonTaskList>(body) {
            Ok(JsonTaskList::Records(rows)) => TaskListDocument::Records(rows),
            Ok(JsonTaskList::Markup(markup)) => TaskListDocument::Markup(markup),
            Err(err) => {
                log::debug!("task list labelled JSON did not decode ({err}), reading as markup");
                TaskListDocument::Markup(body.to_string())
            }
        }
    } else {
        TaskListDocument::Markup(body.to_string())
    };

    match &document {
        TaskListDocument::Markup(markup) if markup.trim().is_empty() => FetchOutcome::Empty,
        TaskListDocument::Records(rows) if rows.is_empty() => FetchOutcome::Empty,
        _ => FetchOutcome::Tasks(document),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::{Method, StatusCode};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};
    use tokio::task::JoinHandle;

    fn service() -> HttpTaskService {
        HttpTaskService::new(&Config {
            employee_id: "10005315".to_string(),
            fetch_url: "http://tasks.test/S1/Test5".to_string(),
            add_url: "http://tasks.test/S1/Addtask".to_string(),
            remove_url: "http://tasks.test/V1/RemoveTask".to_string(),
        })
    }

    fn body_text(request: &Request) -> String {
        let bytes = request.body().and_then(|b| b.as_bytes()).unwrap_or_default();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[test]
    fn fetch_encodes_employee_id() {
        let request = service().fetch_request("10 005&315").unwrap();
        assert_eq!(request.method(), Method::GET);
        assert_eq!(request.url().path(), "/S1/Test5");
        let pairs: Vec<(String, String)> = request.url().query_pairs().into_owned().collect();
        assert_eq!(pairs, vec![("EmployeeID".to_string(), "10 005&315".to_string())]);
        assert_eq!(request.url().query(), Some("EmployeeID=10+005%26315"));
    }

    #[test]
    fn add_posts_urlencoded_form() {
        let task = NewTask::new("10005315", "Alice", "Write report", "2024-01-01", "").unwrap();
        let request = service().add_request(&task).unwrap();
        assert_eq!(request.method(), Method::POST);
        assert_eq!(
            request.headers()[CONTENT_TYPE],
            "application/x-www-form-urlencoded"
        );
        assert_eq!(
            body_text(&request),
            "eID=10005315&eName=Alice&TaskDescription=Write+report&StartDate=2024-01-01&EndDate="
        );
    }

    #[test]
    fn remove_sends_comma_joined_plain_text() {
        let request = service().remove_request("Alice", "Write report").unwrap();
        assert_eq!(request.method(), Method::DELETE);
        assert_eq!(request.headers()[CONTENT_TYPE], "text/plain");
        assert_eq!(body_text(&request), "Alice,Write report");
    }

    #[test]
    fn remove_refuses_embedded_commas() {
        assert!(matches!(
            delete_body("Smith, Alice", "Write report"),
            Err(TaskError::AmbiguousDelete)
        ));
        assert!(matches!(
            delete_body("Alice", "Draft, then review"),
            Err(TaskError::AmbiguousDelete)
        ));
    }

    #[test]
    fn whitespace_body_means_no_tasks() {
        assert_eq!(decode_task_list("  \n\t ", false), FetchOutcome::Empty);
        assert_eq!(decode_task_list("", false), FetchOutcome::Empty);
    }

    #[test]
    fn markup_body_is_kept_verbatim() {
        let body = "  <table><tr><th>ID</th></tr></table>\n";
        assert_eq!(
            decode_task_list(body, false),
            FetchOutcome::Tasks(TaskListDocument::Markup(body.to_string()))
        );
    }

    #[test]
    fn json_records_and_wrapped_markup() {
        let records = r#"[{"employeeName":"Alice","taskDescription":"Write report"}]"#;
        match decode_task_list(records, true) {
            FetchOutcome::Tasks(TaskListDocument::Records(rows)) => assert_eq!(rows[0].employee_name, "Alice"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(decode_task_list("[]", true), FetchOutcome::Empty);
        assert_eq!(
            decode_task_list(r#""<table></table>""#, true),
            FetchOutcome::Tasks(TaskListDocument::Markup("<table></table>".to_string()))
        );
        assert_eq!(decode_task_list(r#""  ""#, true), FetchOutcome::Empty);
    }

    #[test]
    fn mislabelled_json_falls_back_to_markup() {
        let body = "<table><tr><th>ID</th></tr></table>";
        assert_eq!(
            decode_task_list(body, true),
            FetchOutcome::Tasks(TaskListDocument::Markup(body.to_string()))
        );
    }

    fn http_response(status: &str, content_type: &str, body: &str) -> String {
        format!(
            "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        )
    }

    /// Reads one request: headers, then as many body bytes as Content-Length says.
    async fn read_request(socket: &mut TcpStream) -> String {
        let mut data = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            data.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&data);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if data.len() >= end + 4 + length {
                    break;
                }
            }
        }
        String::from_utf8_lossy(&data).into_owned()
    }

    /// Serves one canned response and hands back the raw request it received.
    async fn serve_once(response: String) -> (HttpTaskService, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        let handle = tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let request = read_request(&mut socket).await;
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
            request
        });
        // Loopback only; ignore any proxy set in the environment.
        let service = HttpTaskService {
            client: Client::builder().no_proxy().build().unwrap(),
            fetch_url: format!("{base}/S1/Test5"),
            add_url: format!("{base}/S1/Addtask"),
            remove_url: format!("{base}/V1/RemoveTask"),
        };
        (service, handle)
    }

    #[tokio::test]
    async fn fetch_server_error_is_network_error() {
        let (service, server) = serve_once(http_response("500 Internal Server Error", "text/plain", "boom")).await;
        let err = service.fetch_tasks("10005315").await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::Network { endpoint: "task list", status } if status == StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(server.await.unwrap().starts_with("GET /S1/Test5?EmployeeID=10005315 "));
    }

    #[tokio::test]
    async fn fetch_whitespace_body_is_empty() {
        let (service, _server) = serve_once(http_response("200 OK", "text/html", "  \n ")).await;
        assert_eq!(service.fetch_tasks("10005315").await.unwrap(), FetchOutcome::Empty);
    }

    #[tokio::test]
    async fn fetch_html_body_is_markup() {
        let body = "<table><tr><th>ID</th></tr><tr><td>1</td><td>Alice</td></tr></table>";
        let (service, _server) = serve_once(http_response("200 OK", "text/html; charset=utf-8", body)).await;
        assert_eq!(
            service.fetch_tasks("10005315").await.unwrap(),
            FetchOutcome::Tasks(TaskListDocument::Markup(body.to_string()))
        );
    }

    #[tokio::test]
    async fn fetch_json_content_type_reads_records() {
        let body = r#"[{"employeeName":"Alice","taskDescription":"Write report","rating":"5"}]"#;
        let (service, _server) = serve_once(http_response("200 OK", "application/json", body)).await;
        match service.fetch_tasks("10005315").await.unwrap() {
            FetchOutcome::Tasks(TaskListDocument::Records(rows)) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0].task_description, "Write report");
                assert_eq!(rows[0].rating, "5");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn add_with_html_reply_is_parse_error() {
        let (service, server) = serve_once(http_response("200 OK", "text/html", "<h1>Saved</h1>")).await;
        let task = NewTask::new("10005315", "Alice", "Write report", "", "").unwrap();
        let err = service.add_task(&task).await.unwrap_err();
        assert!(matches!(err, TaskError::Parse(_)));
        let request = server.await.unwrap();
        assert!(request.starts_with("POST /S1/Addtask "));
        assert!(request.ends_with("eID=10005315&eName=Alice&TaskDescription=Write+report&StartDate=&EndDate="));
    }

    #[tokio::test]
    async fn add_reads_message_regardless_of_status() {
        let (service, _server) = serve_once(http_response(
            "400 Bad Request",
            "application/json",
            r#"{"message":"Employee not found"}"#,
        ))
        .await;
        let task = NewTask::new("1", "Alice", "Write report", "", "").unwrap();
        let reply = service.add_task(&task).await.unwrap();
        assert_eq!(reply.message.as_deref(), Some("Employee not found"));
    }

    #[tokio::test]
    async fn remove_not_found_is_network_error() {
        let (service, _server) = serve_once(http_response("404 Not Found", "text/plain", "")).await;
        let err = service.remove_task("Alice", "Write report").await.unwrap_err();
        assert!(matches!(
            err,
            TaskError::Network { endpoint: "remove task", status } if status == StatusCode::NOT_FOUND
        ));
    }

    #[tokio::test]
    async fn remove_success_returns_message() {
        let (service, server) =
            serve_once(http_response("200 OK", "application/json", r#"{"message":"Removed"}"#)).await;
        let reply = service.remove_task("Alice", "Write report").await.unwrap();
        assert_eq!(reply.message.as_deref(), Some("Removed"));
        let request = server.await.unwrap();
        assert!(request.starts_with("DELETE /V1/RemoveTask "));
        assert!(request.ends_with("\r\n\r\nAlice,Write report"));
    }
}
