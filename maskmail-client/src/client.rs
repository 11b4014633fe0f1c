use crate::masked_email::{
    MaskedEmail, MaskedEmailState, PartialMaskedEmail, MASKED_EMAIL_CAPABILITY,
};
use jmap_client::{
    fetch_session, Error, GetResponse, HttpClient, Id, JmapClient, ReqwestClient, Result,
    Session, SetError, SetOutcome, SetRequest, SetResponse, CORE_CAPABILITY,
};
use std::time::Duration;

pub const FASTMAIL_SESSION_URL: &str = "https://api.fastmail.com/jmap/session";

/// Creation id used by [`MaskmailClient::create`]
pub const NEW_MASKED_EMAIL: &str = "new_masked_email";

/// What happened to the single item a higher-level flow asked for
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    Applied(T),
    Rejected(SetError),
    /// The server mentioned the item in neither the success nor failure map
    NotReported,
}

impl<T> Change<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Change::Applied(_))
    }
}

pub struct MaskmailClient<C: HttpClient = ReqwestClient> {
    inner: JmapClient<C>,
    session: Session,
}

impl MaskmailClient<ReqwestClient> {
    /// Resolve the Fastmail session and bind to the masked email account
    pub async fn new(token: String, timeout: Duration) -> Result<Self> {
        Self::connect_to(token, FASTMAIL_SESSION_URL, timeout).await
    }

    pub async fn connect_to(token: String, session_url: &str, timeout: Duration) -> Result<Self> {
        let http_client = ReqwestClient::new().with_token(token);
        Self::connect(http_client, session_url, timeout).await
    }
}

impl<C: HttpClient> MaskmailClient<C> {
    pub async fn connect(http: C, session_url: &str, timeout: Duration) -> Result<Self> {
        let session = fetch_session(&http, session_url, timeout).await?;
        let account_id = select_account_id(&session)?.clone();

        tracing::debug!(account_id = %account_id, "using masked email account");

        let inner =
            JmapClient::new(http, session.api_url.clone(), account_id).with_timeout(timeout);
        Ok(Self { inner, session })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn account_id(&self) -> &Id {
        self.inner.account_id()
    }

    /// `MaskedEmail/get`, passed through unchanged
    ///
    /// Every entry is decoded as a full [`MaskedEmail`], so `properties`
    /// must still include `id`, `email`, `createdAt` and `createdBy`. A reply
    /// trimmed below that fails with a validation error.
    pub async fn get(
        &self,
        ids: Option<Vec<Id>>,
        properties: Option<Vec<String>>,
    ) -> Result<GetResponse<MaskedEmail>> {
        self.inner.get(ids, properties).await
    }

    pub fn set_request(&self) -> SetRequest<MaskedEmail> {
        self.inner.set_request()
    }

    /// `MaskedEmail/set`, passed through unchanged
    pub async fn set(
        &self,
        request: &SetRequest<MaskedEmail>,
    ) -> Result<SetResponse<MaskedEmail>> {
        self.inner.set(request).await
    }

    /// All masked emails, optionally keeping only one state
    pub async fn list(&self, state: Option<MaskedEmailState>) -> Result<Vec<MaskedEmail>> {
        let mut list = self.get(None, None).await?.list;
        if let Some(state) = state {
            list.retain(|m| m.state == Some(state));
        }
        Ok(list)
    }

    /// Look a masked email up by id or by address
    pub async fn find(&self, id_or_email: &str) -> Result<Option<MaskedEmail>> {
        if !id_or_email.contains('@') {
            if let Ok(id) = Id::new(id_or_email) {
                let resp = self.get(Some(vec![id]), None).await?;
                return Ok(resp.list.into_iter().next());
            }
        }

        let list = self.get(None, None).await?.list;
        Ok(list
            .into_iter()
            .find(|m| m.email.eq_ignore_ascii_case(id_or_email)))
    }

    /// Create one masked email
    pub async fn create(&self, create: PartialMaskedEmail) -> Result<Change<MaskedEmail>> {
        let creation_id = Id::new(NEW_MASKED_EMAIL)?;
        let request = self.set_request().create(creation_id, create);
        let response = self.set(&request).await?;

        let change = match response.create_outcome(NEW_MASKED_EMAIL) {
            SetOutcome::Done(Some(created)) => Change::Applied(created.clone()),
            SetOutcome::Done(None) => Change::NotReported,
            SetOutcome::Rejected(err) => Change::Rejected(err.clone()),
            SetOutcome::Unreported => Change::NotReported,
        };

        if !change.is_applied() {
            tracing::warn!(?change, "no masked email was created");
        }
        Ok(change)
    }

    /// Apply a patch to one masked email
    pub async fn update(
        &self,
        id: &Id,
        patch: PartialMaskedEmail,
    ) -> Result<Change<Option<MaskedEmail>>> {
        let request = self.set_request().update(id.clone(), patch);
        let response = self.set(&request).await?;

        let change = match response.update_outcome(id.as_str()) {
            SetOutcome::Done(updated) => Change::Applied(updated.cloned()),
            SetOutcome::Rejected(err) => Change::Rejected(err.clone()),
            SetOutcome::Unreported => Change::NotReported,
        };

        if !change.is_applied() {
            tracing::warn!(id = %id, ?change, "masked email was not updated");
        }
        Ok(change)
    }

    pub async fn set_state(
        &self,
        id: &Id,
        state: MaskedEmailState,
    ) -> Result<Change<Option<MaskedEmail>>> {
        self.update(id, PartialMaskedEmail::new().state(state)).await
    }

    /// Destroy one masked email outright
    pub async fn destroy(&self, id: &Id) -> Result<Change<()>> {
        let request = self.set_request().destroy(id.clone());
        let response = self.set(&request).await?;

        let change = match response.destroy_outcome(id.as_str()) {
            SetOutcome::Done(_) => Change::Applied(()),
            SetOutcome::Rejected(err) => Change::Rejected(err.clone()),
            SetOutcome::Unreported => Change::NotReported,
        };

        if !change.is_applied() {
            tracing::warn!(id = %id, ?change, "masked email was not destroyed");
        }
        Ok(change)
    }
}

/// Primary masked email account, checked against the session's capabilities
/// and account list
fn select_account_id(session: &Session) -> Result<&Id> {
    for capability in [CORE_CAPABILITY, MASKED_EMAIL_CAPABILITY] {
        if !session.has_capability(capability) {
            return Err(Error::validation(format!(
                "session does not advertise capability {}",
                capability
            )));
        }
    }

    let id = session
        .primary_account(MASKED_EMAIL_CAPABILITY)
        .ok_or_else(|| Error::validation("no primary account for masked email"))?;

    if session.account(id).is_none() {
        return Err(Error::validation(format!(
            "primary masked email account {} is not in the account list",
            id
        )));
    }

    Ok(id)
}
