// # Updater Trait
//
// Defines a single "tell the endpoint we are here" attempt.
//
// ## Implementations
//
// - HTTP GET: `crate::updater::HttpUpdater`
//
// ## Usage
//
// ```rust,ignore
// use nextdns_core::Updater;
//
// async fn once(updater: &dyn Updater) {
//     let ok = updater
//         .attempt_update("https://link-ip.nextdns.io/abc123/def456")
//         .await;
//     println!("updated: {ok}");
// }
// ```

use async_trait::async_trait;

/// A single-shot endpoint notification
///
/// # Contract
///
/// - Exactly one attempt per call, no retries. The next scheduled cycle is
///   the only retry.
/// - Every failure is folded into `false`; implementations never panic on a
///   bad endpoint or a bad response.
/// - Implementations report the outcome of the attempt themselves (one log
///   line per call).
#[async_trait]
pub trait Updater: Send + Sync {
    /// Attempt one update against `endpoint`
    ///
    /// Returns `true` only when the endpoint confirmed the update.
    async fn attempt_update(&self, endpoint: &str) -> bool;

    /// Short name used in logs
    fn updater_name(&self) -> &'static str;
}
