use std::fmt;
use std::sync::Arc;

use crate::errors::PipelineResult;
use crate::foundation::BoxFuture;
use crate::request::HttpRequest;
use crate::response::HttpResponse;

/// Type alias for boxed future in Next
pub type NextFuture<'a> = BoxFuture<'a, PipelineResult<Box<dyn HttpResponse>>>;

/// Next represents the rest of the policy chain
pub struct Next {
    handler: Box<dyn FnOnce(HttpRequest) -> NextFuture<'static> + Send>,
}

impl Next {
    /// Create a new Next with a handler function
    pub fn new<F>(handler: F) -> Self
    where
        F: FnOnce(HttpRequest) -> NextFuture<'static> + Send + 'static,
    {
        Self {
            handler: Box::new(handler),
        }
    }

    /// Run the rest of the chain with the given request
    pub async fn run(self, request: HttpRequest) -> PipelineResult<Box<dyn HttpResponse>> {
        (self.handler)(request).await
    }
}

impl fmt::Debug for Next {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next").finish_non_exhaustive()
    }
}

/// A stage in the request/response chain
pub trait PipelinePolicy: Send + Sync + fmt::Debug {
    /// Handle the request and call the next policy in the chain
    fn handle(&self, request: HttpRequest, next: Next) -> NextFuture<'static>;

    /// Optional policy name for debugging
    fn name(&self) -> &'static str {
        "PipelinePolicy"
    }
}

/// Terminal stage that sends the request and produces a response
pub trait Transport: Send + Sync + fmt::Debug {
    fn send(&self, request: HttpRequest) -> NextFuture<'static>;
}

/// Ordered policies in front of a transport
#[derive(Debug, Clone)]
pub struct HttpPipeline {
    policies: Vec<Arc<dyn PipelinePolicy>>,
    transport: Arc<dyn Transport>,
}

impl HttpPipeline {
    /// Create a pipeline with no policies
    pub fn new<T: Transport + 'static>(transport: T) -> Self {
        Self {
            policies: Vec::new(),
            transport: Arc::new(transport),
        }
    }

    /// Add policy to the pipeline
    pub fn add<P: PipelinePolicy + 'static>(mut self, policy: P) -> Self {
        self.policies.push(Arc::new(policy));
        self
    }

    /// Send a request through every policy and then the transport
    pub async fn send(&self, request: HttpRequest) -> PipelineResult<Box<dyn HttpResponse>> {
        let transport = self.transport.clone();
        let mut chain = Box::new(move |req: HttpRequest| transport.send(req))
            as Box<dyn FnOnce(HttpRequest) -> NextFuture<'static> + Send>;

        for policy in self.policies.iter().rev() {
            let policy = policy.clone();
            let next_handler = chain;
            chain = Box::new(move |req: HttpRequest| {
                let next = Next::new(next_handler);
                policy.handle(req, next)
            });
        }

        chain(request).await
    }

    /// Get number of policies in pipeline
    pub fn len(&self) -> usize {
        self.policies.len()
    }

    /// Check if pipeline is empty
    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Get policy names for debugging
    pub fn names(&self) -> Vec<&'static str> {
        self.policies.iter().map(|p| p.name()).collect()
    }
}
