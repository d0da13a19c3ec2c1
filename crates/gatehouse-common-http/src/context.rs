// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Per-request cancellation and deadline.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// Why a bounded call stopped before completing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Interrupted {
	/// The caller cancelled the request.
	#[error("request cancelled")]
	Cancelled,

	/// The request deadline passed.
	#[error("request deadline exceeded")]
	DeadlineExceeded,
}

/// Caller-supplied context for a single gateway request.
///
/// Cloning shares the cancellation token, so cancelling any clone (or the
/// token the gateway handed in) stops every call made under it. The deadline
/// is absolute: sequential calls share one budget.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
	cancellation: CancellationToken,
	deadline: Option<Instant>,
}

impl RequestContext {
	pub fn new() -> Self {
		Self::default()
	}

	/// Bind to a cancellation token owned by the caller.
	pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
		self.cancellation = token;
		self
	}

	/// Set the deadline `timeout` from now.
	pub fn with_timeout(self, timeout: Duration) -> Self {
		self.with_deadline(Instant::now() + timeout)
	}

	pub fn with_deadline(mut self, deadline: Instant) -> Self {
		self.deadline = Some(deadline);
		self
	}

	pub fn deadline(&self) -> Option<Instant> {
		self.deadline
	}

	pub fn cancellation_token(&self) -> &CancellationToken {
		&self.cancellation
	}

	pub fn cancel(&self) {
		self.cancellation.cancel();
	}

	pub fn is_cancelled(&self) -> bool {
		self.cancellation.is_cancelled()
	}

	/// Cancelled, or past the deadline.
	pub fn is_done(&self) -> bool {
		self.is_cancelled() || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
	}

	/// Drive `fut` to completion unless the context is cancelled or its
	/// deadline passes first.
	///
	/// On interruption `fut` is dropped, which aborts an in-flight `reqwest`
	/// call.
	pub async fn run<F>(&self, fut: F) -> Result<F::Output, Interrupted>
	where
		F: Future,
	{
		if self.cancellation.is_cancelled() {
			return Err(Interrupted::Cancelled);
		}

		let bounded = async {
			match self.deadline {
				Some(deadline) => tokio::time::timeout_at(deadline, fut)
					.await
					.map_err(|_| Interrupted::DeadlineExceeded),
				None => Ok(fut.await),
			}
		};

		tokio::select! {
			biased;
			_ = self.cancellation.cancelled() => {
				tracing::debug!("request cancelled by caller");
				Err(Interrupted::Cancelled)
			}
			result = bounded => result,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[tokio::test]
	async fn completes_without_limits() {
		let ctx = RequestContext::new();
		assert_eq!(ctx.run(async { 7 }).await, Ok(7));
	}

	#[tokio::test]
	async fn already_cancelled_never_polls() {
		let ctx = RequestContext::new();
		ctx.cancel();

		let mut polled = false;
		let result = ctx
			.run(async {
				polled = true;
			})
			.await;

		assert_eq!(result, Err(Interrupted::Cancelled));
		assert!(!polled);
	}

	#[tokio::test]
	async fn cancellation_interrupts_pending_call() {
		let token = CancellationToken::new();
		let ctx = RequestContext::new().with_cancellation(token.clone());

		let canceller = tokio::spawn(async move {
			tokio::time::sleep(Duration::from_millis(20)).await;
			token.cancel();
		});

		let result = ctx.run(std::future::pending::<()>()).await;
		assert_eq!(result, Err(Interrupted::Cancelled));
		canceller.await.unwrap();
	}

	#[tokio::test(start_paused = true)]
	async fn deadline_interrupts_pending_call() {
		let ctx = RequestContext::new().with_timeout(Duration::from_secs(2));
		let result = ctx.run(std::future::pending::<()>()).await;
		assert_eq!(result, Err(Interrupted::DeadlineExceeded));
	}

	#[tokio::test(start_paused = true)]
	async fn deadline_is_shared_across_calls() {
		let ctx = RequestContext::new().with_timeout(Duration::from_secs(3));

		let first = ctx
			.run(tokio::time::sleep(Duration::from_secs(2)))
			.await;
		assert!(first.is_ok());

		let second = ctx
			.run(tokio::time::sleep(Duration::from_secs(2)))
			.await;
		assert_eq!(second, Err(Interrupted::DeadlineExceeded));
		assert!(ctx.is_done());
		assert!(!ctx.is_cancelled());
	}

	#[test]
	fn clones_share_cancellation() {
		let ctx = RequestContext::new();
		let clone = ctx.clone();
		clone.cancel();
		assert!(ctx.is_cancelled());
		assert!(tokio_test::block_on(ctx.run(async {})).is_err());
	}
}
