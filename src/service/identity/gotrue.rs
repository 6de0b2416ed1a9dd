use url::Url;

use super::session::{Session, SessionCookies};
use super::{pkce, CookieStore, Error};

#[derive(serde::Serialize)]
struct ExchangeRequest<'a> {
    auth_code: &'a str,
    code_verifier: &'a str,
}

#[derive(serde::Serialize)]
struct MagicLinkRequest<'a> {
    email: &'a str,
    create_user: bool,
    code_challenge: &'a str,
    code_challenge_method: &'a str,
}

#[derive(Debug, Default, serde::Deserialize)]
struct ErrorPayload {
    error_description: Option<String>,
    msg: Option<String>,
    message: Option<String>,
    error: Option<String>,
}

impl ErrorPayload {
    fn into_message(self, fallback: String) -> String {
        self.error_description
            .or(self.msg)
            .or(self.message)
            .or(self.error)
            .unwrap_or(fallback)
    }
}

/// Client for the hosted authentication API (GoTrue).
#[derive(Debug)]
pub(crate) struct Client {
    http: reqwest::Client,
    base_url: String,
    anon_key: String,
    cookies: SessionCookies,
}

impl Client {
    pub fn new(base_url: Url, anon_key: String, project_ref: &str, secure: bool) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.as_str().trim_end_matches('/').to_string(),
            anon_key,
            cookies: SessionCookies::new(project_ref, secure),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn check(response: reqwest::Response) -> Result<reqwest::Response, Error> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorPayload>(&body)
            .unwrap_or_default()
            .into_message(body);
        Err(Error::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}

#[axum::async_trait]
impl super::IdentityProvider for Client {
    #[tracing::instrument(level = "debug", skip_all)]
    async fn exchange_code_for_session(
        &self,
        code: &str,
        cookies: &mut dyn CookieStore,
    ) -> Result<(), Error> {
        let verifier = self
            .cookies
            .read_verifier(&*cookies)
            .ok_or(Error::MissingCodeVerifier)?;

        let response = self
            .http
            .post(self.endpoint("token?grant_type=pkce"))
            .header("apikey", self.anon_key.as_str())
            .json(&ExchangeRequest {
                auth_code: code,
                code_verifier: verifier.as_str(),
            })
            .send()
            .await
            .map_err(Error::Transport)?;
        tracing::debug!("received response {:?}", response.status());
        let session: Session = Self::check(response)
            .await?
            .json()
            .await
            .map_err(Error::Decode)?;

        self.cookies.write(cookies, &session.with_expiry());
        self.cookies.clear_verifier(cookies);
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn sign_out(&self, cookies: &mut dyn CookieStore) -> Result<(), Error> {
        let Some(session) = self.cookies.read(&*cookies) else {
            tracing::debug!("no session found, nothing to revoke");
            self.cookies.clear(cookies);
            return Ok(());
        };

        let response = self
            .http
            .post(self.endpoint("logout?scope=global"))
            .header("apikey", self.anon_key.as_str())
            .bearer_auth(session.access_token.as_str())
            .send()
            .await
            .map_err(Error::Transport)?;
        tracing::debug!("received response {:?}", response.status());

        match Self::check(response).await {
            Ok(_) => {}
            // the session is already gone on the provider side
            Err(Error::Rejected { status, .. }) if matches!(status, 401 | 403 | 404) => {
                tracing::debug!(message = "session already revoked", status);
            }
            Err(err) => return Err(err),
        }
        self.cookies.clear(cookies);
        Ok(())
    }

    fn begin_pkce(&self, cookies: &mut dyn CookieStore) -> String {
        let verifier = pkce::generate_verifier();
        let challenge = pkce::challenge(&verifier);
        self.cookies.write_verifier(cookies, verifier);
        challenge
    }

    fn authorize_url(
        &self,
        provider: &str,
        redirect_to: &Url,
        code_challenge: &str,
    ) -> Result<Url, Error> {
        Url::parse_with_params(
            &self.endpoint("authorize"),
            &[
                ("provider", provider),
                ("redirect_to", redirect_to.as_str()),
                ("code_challenge", code_challenge),
                ("code_challenge_method", pkce::METHOD),
            ],
        )
        .map_err(Error::InvalidUrl)
    }

    #[tracing::instrument(level = "debug", skip_all)]
    async fn send_magic_link(
        &self,
        email: &str,
        redirect_to: &Url,
        code_challenge: &str,
    ) -> Result<(), Error> {
        let url = Url::parse_with_params(
            &self.endpoint("otp"),
            &[("redirect_to", redirect_to.as_str())],
        )
        .map_err(Error::InvalidUrl)?;
        let response = self
            .http
            .post(url)
            .header("apikey", self.anon_key.as_str())
            .json(&MagicLinkRequest {
                email,
                create_user: true,
                code_challenge,
                code_challenge_method: pkce::METHOD,
            })
            .send()
            .await
            .map_err(Error::Transport)?;
        tracing::debug!("received response {:?}", response.status());
        Self::check(response).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;
    use url::Url;

    use super::Client;
    use crate::service::identity::fake::MemoryCookies;
    use crate::service::identity::session::SessionCookies;
    use crate::service::identity::{CookieStore, Error, IdentityProvider};

    const SESSION: &str = r#"{
        "access_token": "access",
        "refresh_token": "refresh",
        "token_type": "bearer",
        "expires_in": 3600,
        "user": {"id": "00000000-0000-0000-0000-000000000001", "email": "alice@example.com"}
    }"#;

    fn client(server: &mockito::Server) -> Client {
        Client::new(
            Url::parse(&server.url()).unwrap(),
            "anon".into(),
            "project",
            false,
        )
    }

    fn with_verifier() -> MemoryCookies {
        let mut cookies = MemoryCookies::default();
        SessionCookies::new("project", false).write_verifier(&mut cookies, "verifier".into());
        cookies
    }

    #[tokio::test]
    async fn should_exchange_code() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::UrlEncoded("grant_type".into(), "pkce".into()))
            .match_header("apikey", "anon")
            .match_body(Matcher::Json(serde_json::json!({
                "auth_code": "abc",
                "code_verifier": "verifier",
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(SESSION)
            .create_async()
            .await;

        let mut cookies = with_verifier();
        client(&server)
            .exchange_code_for_session("abc", &mut cookies)
            .await
            .unwrap();
        mock.assert_async().await;

        let session = SessionCookies::new("project", false)
            .read(&cookies)
            .unwrap();
        assert_eq!(session.access_token, "access");
        assert!(session.expires_at.is_some());
        assert!(cookies.get("sb-project-auth-token-code-verifier").is_none());
    }

    #[tokio::test]
    async fn should_fail_without_verifier() {
        crate::enable_tracing();

        let server = mockito::Server::new_async().await;
        let mut cookies = MemoryCookies::default();
        let err = client(&server)
            .exchange_code_for_session("abc", &mut cookies)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::MissingCodeVerifier));
        assert!(cookies.list().is_empty());
    }

    #[tokio::test]
    async fn should_report_rejected_code() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(400)
            .with_header("content-type", "application/json")
            .with_body(r#"{"error":"invalid_grant","error_description":"Code has expired"}"#)
            .create_async()
            .await;

        let mut cookies = with_verifier();
        let err = client(&server)
            .exchange_code_for_session("abc", &mut cookies)
            .await
            .unwrap_err();
        match err {
            Error::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Code has expired");
            }
            other => panic!("unexpected error {other:?}"),
        }
        assert!(SessionCookies::new("project", false).read(&cookies).is_none());
    }

    #[tokio::test]
    async fn should_report_undecodable_session() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/token")
            .match_query(Matcher::Any)
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let mut cookies = with_verifier();
        let err = client(&server)
            .exchange_code_for_session("abc", &mut cookies)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[tokio::test]
    async fn should_sign_out_and_clear_cookies() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/logout")
            .match_query(Matcher::UrlEncoded("scope".into(), "global".into()))
            .match_header("authorization", "Bearer access")
            .with_status(204)
            .create_async()
            .await;

        let conf = SessionCookies::new("project", false);
        let mut cookies = MemoryCookies::default();
        conf.write(&mut cookies, &serde_json::from_str(SESSION).unwrap());

        client(&server).sign_out(&mut cookies).await.unwrap();
        mock.assert_async().await;
        assert!(cookies.list().is_empty());
    }

    #[tokio::test]
    async fn should_clear_cookies_when_session_already_revoked() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/logout")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"msg":"invalid JWT"}"#)
            .create_async()
            .await;

        let conf = SessionCookies::new("project", false);
        let mut cookies = MemoryCookies::default();
        conf.write(&mut cookies, &serde_json::from_str(SESSION).unwrap());

        client(&server).sign_out(&mut cookies).await.unwrap();
        assert!(cookies.list().is_empty());
    }

    #[tokio::test]
    async fn should_keep_cookies_when_sign_out_fails() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/auth/v1/logout")
            .match_query(Matcher::Any)
            .with_status(500)
            .with_body(r#"{"message":"database unavailable"}"#)
            .create_async()
            .await;

        let conf = SessionCookies::new("project", false);
        let mut cookies = MemoryCookies::default();
        conf.write(&mut cookies, &serde_json::from_str(SESSION).unwrap());

        let err = client(&server).sign_out(&mut cookies).await.unwrap_err();
        assert!(matches!(err, Error::Rejected { status: 500, .. }));
        assert!(conf.read(&cookies).is_some());
    }

    #[tokio::test]
    async fn should_sign_out_without_session() {
        crate::enable_tracing();

        let server = mockito::Server::new_async().await;
        let mut cookies = MemoryCookies::default();
        client(&server).sign_out(&mut cookies).await.unwrap();
        assert!(cookies.list().is_empty());
    }

    #[tokio::test]
    async fn should_send_magic_link() {
        crate::enable_tracing();

        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/auth/v1/otp")
            .match_query(Matcher::UrlEncoded(
                "redirect_to".into(),
                "http://localhost:3000/auth/callback?next=%2F".into(),
            ))
            .match_body(Matcher::PartialJson(serde_json::json!({
                "email": "alice@example.com",
                "code_challenge": "challenge",
                "code_challenge_method": "s256",
            })))
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let redirect_to = Url::parse("http://localhost:3000/auth/callback?next=%2F").unwrap();
        client(&server)
            .send_magic_link("alice@example.com", &redirect_to, "challenge")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn should_build_authorize_url() {
        let server = mockito::Server::new_async().await;
        let client = client(&server);

        let mut cookies = MemoryCookies::default();
        let challenge = client.begin_pkce(&mut cookies);
        let verifier = SessionCookies::new("project", false)
            .read_verifier(&cookies)
            .unwrap();
        assert_eq!(
            challenge,
            crate::service::identity::pkce::challenge(&verifier)
        );

        let redirect_to = Url::parse("http://localhost:3000/auth/callback?next=%2F").unwrap();
        let url = client
            .authorize_url("google", &redirect_to, &challenge)
            .unwrap();
        assert_eq!(url.path(), "/auth/v1/authorize");
        let params = url
            .query_pairs()
            .into_owned()
            .collect::<std::collections::HashMap<_, _>>();
        assert_eq!(params.get("provider").unwrap(), "google");
        assert_eq!(params.get("redirect_to").unwrap(), redirect_to.as_str());
        assert_eq!(params.get("code_challenge").unwrap(), &challenge);
        assert_eq!(params.get("code_challenge_method").unwrap(), "s256");
    }
}
