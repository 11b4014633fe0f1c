// jmap-client/src/client.rs
use crate::envelope::{self, Method};
use crate::error::Result;
use crate::http::HttpClient;
use crate::id::Id;
use crate::methods::{GetRequest, GetResponse, JmapObject, SetRequest, SetResponse};
use std::time::Duration;

/// Call id used for the single invocation in each request
const CALL_ID: &str = "a";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

pub struct JmapClient<C: HttpClient> {
    http: C,
    api_url: String,
    account_id: Id,
    timeout: Duration,
}

impl<C: HttpClient> JmapClient<C> {
    pub fn new(http: C, api_url: String, account_id: Id) -> Self {
        Self {
            http,
            api_url,
            account_id,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Bound applied to every call made by this client
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn account_id(&self) -> &Id {
        &self.account_id
    }

    /// Make a JMAP request carrying a single method call
    pub async fn call<M: Method>(&self, request: &M) -> Result<M::Response> {
        let body = envelope::encode(request, CALL_ID)?;
        tracing::debug!(method = %M::name(), "calling");

        let resp_bytes = self
            .http
            .post_json(&self.api_url, body, self.timeout)
            .await?;

        envelope::decode::<M>(&resp_bytes, CALL_ID)
    }

    /// `Foo/get`; `ids: None` fetches every object
    ///
    /// The list comes back in server order, unfiltered.
    pub async fn get<T: JmapObject>(
        &self,
        ids: Option<Vec<Id>>,
        properties: Option<Vec<String>>,
    ) -> Result<GetResponse<T>> {
        let request = GetRequest::<T>::new(self.account_id.clone())
            .ids(ids)
            .properties(properties);

        let response = self.call(&request).await?;
        response.check_not_found(request.ids.as_deref())?;

        tracing::debug!(
            object = T::NAME,
            found = response.list.len(),
            not_found = response.not_found.len(),
            state = %response.state,
            "get complete"
        );
        Ok(response)
    }

    /// Start a `Foo/set` request for this client's account
    pub fn set_request<T: JmapObject>(&self) -> SetRequest<T> {
        SetRequest::new(self.account_id.clone())
    }

    /// `Foo/set`
    pub async fn set<T: JmapObject>(&self, request: &SetRequest<T>) -> Result<SetResponse<T>> {
        let response = self.call(request).await?;
        response.check_pairing()?;

        tracing::debug!(
            object = T::NAME,
            old_state = ?response.old_state,
            new_state = ?response.new_state,
            "set complete"
        );
        Ok(response)
    }
}
