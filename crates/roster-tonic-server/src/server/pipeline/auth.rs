//! Bearer-token authentication and method visibility.

use super::{Call, CallResult, Next, Stage};
use futures::future::BoxFuture;
use roster_tonic_core::{
    error::IntoStatus,
    methods::PUBLIC_METHODS,
    roster::{Identity, TokenCodec},
};
use std::{collections::BTreeSet, sync::Arc};
use tonic::{Status, metadata::MetadataMap};

const AUTHORIZATION: &str = "authorization";
const BEARER_PREFIX: &str = "Bearer ";

/// Whether a method needs a credential.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Access {
    Public,
    Protected,
}

/// Static table of methods callable without a credential.
///
/// Anything not listed, including paths no service implements, is
/// [`Access::Protected`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Visibility {
    public: BTreeSet<String>,
}

impl Visibility {
    pub fn new<I, S>(public: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            public: public.into_iter().map(Into::into).collect(),
        }
    }

    pub fn classify(&self, method: &str) -> Access {
        if self.public.contains(method) {
            Access::Public
        } else {
            Access::Protected
        }
    }

    pub fn public_methods(&self) -> impl Iterator<Item = &str> {
        self.public.iter().map(String::as_str)
    }
}

impl Default for Visibility {
    /// Register and Login only.
    fn default() -> Self {
        Self::new(PUBLIC_METHODS.iter().copied())
    }
}

/// Extracts the token from `authorization: Bearer <token>`.
pub fn bearer_token(metadata: &MetadataMap) -> Result<&str, Status> {
    if metadata.is_empty() {
        return Err(Status::unauthenticated("missing metadata"));
    }

    let value = metadata
        .get(AUTHORIZATION)
        .ok_or_else(|| Status::unauthenticated("missing authorization header"))?;

    let token = value
        .to_str()
        .ok()
        .and_then(|header| header.strip_prefix(BEARER_PREFIX))
        .ok_or_else(|| Status::unauthenticated("invalid authorization header format"))?;

    if token.is_empty() {
        return Err(Status::unauthenticated("missing token"));
    }
    Ok(token)
}

/// Lets public methods through untouched; everything else must present a
/// token the codec accepts, whose identity is then attached to the call.
pub struct Authenticate {
    codec: Arc<TokenCodec>,
    visibility: Visibility,
}

impl Authenticate {
    pub fn new(codec: Arc<TokenCodec>, visibility: Visibility) -> Self {
        Self { codec, visibility }
    }

    pub fn visibility(&self) -> &Visibility {
        &self.visibility
    }

    fn verify(&self, call: &Call) -> Result<Identity, Status> {
        let token = bearer_token(call.metadata())?;
        let claims = self.codec.verify(token).map_err(IntoStatus::into_status)?;
        Ok(Identity::from(claims))
    }
}

impl Stage for Authenticate {
    fn handle<'a, R: Send + 'a>(
        &'a self,
        mut call: Call,
        next: Next<'a, R>,
    ) -> BoxFuture<'a, CallResult<R>> {
        Box::pin(async move {
            if self.visibility.classify(call.method()) == Access::Public {
                return next.run(call).await;
            }

            let identity = self.verify(&call).inspect_err(|status| {
                tracing::debug!(method = call.method(), reason = status.message(), "call rejected");
            })?;
            tracing::debug!(method = call.method(), user_id = %identity.user_id, "call authenticated");
            call.authenticate(identity);
            next.run(call).await
        })
    }
}
