//! Request-scoped remote binding.

use std::sync::Arc;
use std::task::{Context, Poll};

use axum::{
    body::Body,
    http::{Request, Response},
};
use tower::{Layer, Service};
use tributary_remote::Remote;

use crate::extractors::BoundRemote;

/// Layer that attaches the process-wide remote to every request.
///
/// The remote is chosen once at startup; this layer only hands out shared
/// references to it, so handlers never see an unbound request and never
/// observe a different remote mid-request.
#[derive(Clone)]
pub struct RemoteLayer {
    remote: Arc<dyn Remote>,
}

impl RemoteLayer {
    /// Creates the layer for an already selected remote.
    pub fn new(remote: Arc<dyn Remote>) -> Self {
        Self { remote }
    }
}

impl<S> Layer<S> for RemoteLayer {
    type Service = RemoteMiddleware<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RemoteMiddleware {
            inner,
            remote: self.remote.clone(),
        }
    }
}

/// Inserts a [`BoundRemote`] into the request extensions.
#[derive(Clone)]
pub struct RemoteMiddleware<S> {
    inner: S,
    remote: Arc<dyn Remote>,
}

impl<S> Service<Request<Body>> for RemoteMiddleware<S>
where
    S: Service<Request<Body>, Response = Response<Body>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<Body>) -> Self::Future {
        request
            .extensions_mut()
            .insert(BoundRemote(self.remote.clone()));
        self.inner.call(request)
    }
}
