use super::types::Job;
use std::collections::VecDeque;

/// Unbounded FIFO buffer of jobs waiting in front of a station
#[derive(Debug, Clone, Default)]
pub struct JobQueue {
    jobs: VecDeque<Job>,
}

impl JobQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a job at the tail
    pub fn push(&mut self, job: Job) {
        self.jobs.push_back(job);
    }

    /// Remove the job at the head
    pub fn pop(&mut self) -> Option<Job> {
        self.jobs.pop_front()
    }

    pub fn front(&self) -> Option<&Job> {
        self.jobs.front()
    }

    pub fn len(&self) -> usize {
        self.jobs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Job> {
        self.jobs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fifo_order() {
        let mut queue = JobQueue::new();
        assert!(queue.is_empty());
        for id in 1..=3 {
            queue.push(Job::new(id, 1, 0.0));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.front().map(|j| j.id), Some(1));
        let order: Vec<_> = std::iter::from_fn(|| queue.pop()).map(|j| j.id).collect();
        assert_eq!(order, vec![1, 2, 3]);
        assert!(queue.pop().is_none());
    }
}
