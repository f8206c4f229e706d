use std::time::Duration;

/// 固定間隔リトライ
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// 初回を含む試行回数（1以上）
    pub max_attempts: u32,
    pub delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// 1回だけ試行する
    pub fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    pub fn attempts(&self) -> impl Iterator<Item = u32> {
        1..=self.max_attempts
    }

    pub fn is_last(&self, attempt: u32) -> bool {
        attempt >= self.max_attempts
    }
}

/// 待機（0秒ならスキップ）
pub async fn pause(delay: Duration) {
    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_clamps_zero_attempts() {
        let policy = RetryPolicy::new(0, Duration::from_secs(2));
        assert_eq!(policy.max_attempts, 1);
        assert_eq!(policy.attempts().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_policy_attempts() {
        let policy = RetryPolicy::new(5, Duration::from_secs(3));
        assert_eq!(policy.attempts().count(), 5);
        assert!(!policy.is_last(4));
        assert!(policy.is_last(5));
    }

    #[tokio::test]
    async fn test_pause_zero_returns_immediately() {
        let start = std::time::Instant::now();
        pause(Duration::ZERO).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }
}
