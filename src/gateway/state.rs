use std::sync::Arc;
use std::time::Duration;

use crate::matcher::PairScorer;
use crate::model::EsimModel;
use crate::session::InferenceSession;

pub struct HandlerState<S: PairScorer + 'static = EsimModel> {
    pub session: Arc<InferenceSession<S>>,

    /// Upper bound for one catalog scan.
    pub match_timeout: Duration,
}

impl<S: PairScorer + 'static> Clone for HandlerState<S> {
    fn clone(&self) -> Self {
        Self {
            session: Arc::clone(&self.session),
            match_timeout: self.match_timeout,
        }
    }
}

impl<S: PairScorer + 'static> HandlerState<S> {
    pub fn new(session: Arc<InferenceSession<S>>, match_timeout: Duration) -> Self {
        Self {
            session,
            match_timeout,
        }
    }
}
