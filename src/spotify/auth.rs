use crate::{error::SpotifyError, spotify::SpotifyClient, types::TokenResponse};

impl SpotifyClient {
    pub(crate) fn build_authorize_url(&self, state: &str, code_challenge: &str) -> String {
        format!(
            "{auth_url}?client_id={client_id}&response_type=code&redirect_uri={redirect_uri}&scope={scope}&state={state}&code_challenge={code_challenge}&code_challenge_method=S256",
            auth_url = self.config.auth_url,
            client_id = urlencoding::encode(&self.config.client_id),
            redirect_uri = urlencoding::encode(&self.config.redirect_uri),
            scope = urlencoding::encode(&self.config.scope),
            state = urlencoding::encode(state),
            code_challenge = code_challenge,
        )
    }

    pub(crate) async fn exchange_code_pkce(
        &self,
        code: &str,
        verifier: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", self.config.redirect_uri.as_str()),
            ("code_verifier", verifier),
        ])
        .await
    }

    pub(crate) async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(form)
            .send()
            .await?
            .error_for_status()?;

        Ok(res.json::<TokenResponse>().await?)
    }
}
