//! Shared FIFO of job ids waiting for a worker.

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct PendingQueue {
    ids: Mutex<VecDeque<Uuid>>,
    available: Notify,
}

impl PendingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn ids(&self) -> MutexGuard<'_, VecDeque<Uuid>> {
        // The critical sections never panic mid-update, so a poisoned deque is still consistent.
        self.ids.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn push(&self, id: Uuid) {
        self.ids().push_back(id);
        self.available.notify_one();
    }

    /// Waits until an id is available and takes it.
    pub async fn pop(&self) -> Uuid {
        loop {
            let next = self.ids().pop_front();
            if let Some(id) = next {
                return id;
            }
            self.available.notified().await;
        }
    }

    /// 1-based position, or `None` once the id has left the queue.
    pub fn position(&self, id: &Uuid) -> Option<usize> {
        self.ids().iter().position(|queued| queued == id).map(|i| i + 1)
    }

    pub fn remove(&self, id: &Uuid) -> bool {
        let mut ids = self.ids();
        match ids.iter().position(|queued| queued == id) {
            Some(index) => ids.remove(index).is_some(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fifo_order_and_positions() {
        let queue = PendingQueue::new();
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        queue.push(a);
        queue.push(b);
        queue.push(c);

        assert_eq!(queue.position(&c), Some(3));
        assert!(queue.remove(&b));
        assert!(!queue.remove(&b));
        assert_eq!(queue.position(&c), Some(2));

        assert_eq!(queue.pop().await, a);
        assert_eq!(queue.pop().await, c);
        assert_eq!(queue.position(&a), None);
        assert_eq!(queue.position(&c), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_waits_for_push() {
        let queue = Arc::new(PendingQueue::new());
        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move { queue.pop().await }
        });

        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(!waiter.is_finished());

        let id = Uuid::new_v4();
        queue.push(id);
        assert_eq!(waiter.await.unwrap(), id);
    }
}
