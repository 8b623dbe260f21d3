//! One-shot service subscriptions as futures

use crate::registry::error::{RegistryError, RegistryResult};
use crate::service::api::{ServiceHandle, ServiceInstance};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Future resolving once a subscription is resolved
///
/// Created by `ServiceContext::await_service`. The sending side is the
/// subscription's handler, which the registry runs exactly once.
#[derive(Debug)]
pub struct ServiceWaiter {
    handle: ServiceHandle,
    receiver: oneshot::Receiver<Option<ServiceInstance>>,
}

impl ServiceWaiter {
    pub(crate) fn new(
        handle: ServiceHandle,
        receiver: oneshot::Receiver<Option<ServiceInstance>>,
    ) -> Self {
        Self { handle, receiver }
    }

    /// Handle this waiter subscribed to
    pub fn handle(&self) -> &ServiceHandle {
        &self.handle
    }
}

impl Future for ServiceWaiter {
    type Output = RegistryResult<Option<ServiceInstance>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.receiver).poll(cx) {
            Poll::Ready(Ok(service)) => Poll::Ready(Ok(service)),
            Poll::Ready(Err(_)) => Poll::Ready(Err(RegistryError::SubscriptionDiscarded {
                handle: self.handle.clone(),
            })),
            Poll::Pending => Poll::Pending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::FutureExt;

    const CLOCK: ServiceHandle = ServiceHandle::named("clock");

    #[tokio::test]
    async fn test_waiter_resolves_with_sent_value() {
        let (tx, rx) = oneshot::channel();
        let waiter = ServiceWaiter::new(CLOCK, rx);
        tx.send(Some(ServiceInstance::new("clock", 5u32))).unwrap();

        let service = waiter.await.unwrap().unwrap();
        assert_eq!(*service.downcast::<u32>().unwrap(), 5);
    }

    #[tokio::test]
    async fn test_waiter_resolves_absent() {
        let (tx, rx) = oneshot::channel();
        let waiter = ServiceWaiter::new(CLOCK, rx);
        tx.send(None).unwrap();

        assert!(waiter.await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_dropped_sender_is_discarded() {
        let (tx, rx) = oneshot::channel::<Option<ServiceInstance>>();
        let waiter = ServiceWaiter::new(CLOCK, rx);
        drop(tx);

        assert_eq!(
            waiter.await.unwrap_err(),
            RegistryError::SubscriptionDiscarded { handle: CLOCK }
        );
    }

    #[test]
    fn test_waiter_pending_until_sent() {
        let (tx, rx) = oneshot::channel();
        let mut waiter = ServiceWaiter::new(CLOCK, rx);
        assert!((&mut waiter).now_or_never().is_none());

        tx.send(None).unwrap();
        assert!(matches!(waiter.now_or_never(), Some(Ok(None))));
    }
}
