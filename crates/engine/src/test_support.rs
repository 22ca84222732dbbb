use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use net::{Method, Response, Transport, TransportError};

/// Transport that plays back a scripted sequence of responses and records
/// every request it sees. Requests beyond the script get a 404.
pub(crate) struct ScriptedTransport {
    responses: VecDeque<Result<Response, TransportError>>,
    requests: Rc<RefCell<Vec<(Method, String)>>>,
}

impl ScriptedTransport {
    pub fn empty() -> Self {
        Self::new([])
    }

    pub fn new(
        responses: impl IntoIterator<Item = Result<Response, TransportError>>,
    ) -> Self {
        Self {
            responses: responses.into_iter().collect(),
            requests: Rc::new(RefCell::new(Vec::new())),
        }
    }

    pub fn ok(bodies: impl IntoIterator<Item = &'static str>) -> Self {
        Self::new(bodies.into_iter().map(|body| {
            Ok(Response {
                status: 200,
                body: body.to_string(),
            })
        }))
    }

    /// Shared request log; clone before handing the transport to an engine.
    pub fn requests(&self) -> Rc<RefCell<Vec<(Method, String)>>> {
        Rc::clone(&self.requests)
    }
}

impl Transport for ScriptedTransport {
    fn exchange(&mut self, method: Method, url: &str) -> Result<Response, TransportError> {
        self.requests.borrow_mut().push((method, url.to_string()));
        self.responses.pop_front().unwrap_or(Ok(Response {
            status: 404,
            body: String::new(),
        }))
    }
}
