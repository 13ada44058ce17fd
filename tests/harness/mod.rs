#![allow(dead_code)]

use std::io::Read;
use std::thread::{self, JoinHandle};
use tiny_http::{Header, Response, Server};

/// An app access token grant
pub const APP_TOKEN_OK: &str = r#"{"code":0,"msg":"ok","app_access_token":"a-123","expire":7200}"#;
/// A user token grant for `AT1` / `RT1`
pub const USER_TOKEN_OK: &str = r#"{"code":0,"msg":"success","data":{"access_token":"AT1","refresh_token":"RT1","token_type":"Bearer","expires_in":7140}}"#;
/// A rejected login code
pub const USER_TOKEN_REJECTED: &str = r#"{"code":40001,"msg":"invalid code"}"#;

#[derive(Debug)]
pub struct Recorded {
    pub url: String,
    pub authorization: Option<String>,
    pub body: serde_json::Value,
}

/// Serve one canned JSON reply per entry, in order, then stop
///
/// Every reply carries `X-Tt-Logid: log-42`. Join the handle only when the
/// caller is expected to make all the requests.
pub fn serve(replies: Vec<(u16, &'static str)>) -> (String, JoinHandle<Vec<Recorded>>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();

    let handle = thread::spawn(move || {
        let mut recorded = Vec::new();
        for (status, reply) in replies {
            let mut request = server.recv().unwrap();

            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            let authorization = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string());
            recorded.push(Recorded {
                url: request.url().to_string(),
                authorization,
                body: serde_json::from_str(&body).unwrap(),
            });

            let response = Response::from_string(reply)
                .with_status_code(status)
                .with_header(
                    Header::from_bytes(&b"Content-Type"[..], &b"application/json"[..]).unwrap(),
                )
                .with_header(Header::from_bytes(&b"X-Tt-Logid"[..], &b"log-42"[..]).unwrap());
            request.respond(response).unwrap();
        }
        recorded
    });

    (format!("http://{}", addr), handle)
}
