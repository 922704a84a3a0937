use thiserror::Error;

/// Failures `VnodeHandle::buffer` can surface to a caller. The actor's
/// internal failures (a panicking CCRDT callback, a publish error) never
/// reach here — they are handled inside the flush worker.
#[derive(Debug, Error)]
pub enum BufferError {
    #[error("buffer vnode actor is no longer running")]
    ActorGone,
}
