//! Broadcast fan-out shared by the command use cases.

use crate::domain::{MessagePusher, UserId};

/// Deliver one frame to every target, in the given order. A failed delivery
/// does not abort delivery to the remaining targets; the failed recipients
/// come back to the caller, which runs them through the disconnect path.
pub(crate) async fn fan_out(
    pusher: &dyn MessagePusher,
    targets: &[UserId],
    content: &str,
) -> Vec<UserId> {
    let mut failed = Vec::new();
    for target in targets {
        if let Err(e) = pusher.push_to(target, content).await {
            tracing::warn!("Failed to push message to client '{}': {}", target, e);
            failed.push(target.clone());
        }
    }
    failed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::pusher::MockMessagePusher;
    use crate::domain::{MessagePushError, UserId};
    use mockall::Sequence;

    fn uid(id: &str) -> UserId {
        UserId::new(id.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_fan_out_delivers_in_member_order() {
        // テスト項目: フレームはメンバーの並び順どおりに配信される
        // given (前提条件):
        let mut pusher = MockMessagePusher::new();
        let mut seq = Sequence::new();
        for name in ["alice", "bob", "charlie"] {
            pusher
                .expect_push_to()
                .withf(move |id, content| id.as_str() == name && content == "frame")
                .times(1)
                .in_sequence(&mut seq)
                .returning(|_, _| Ok(()));
        }
        let targets = vec![uid("alice"), uid("bob"), uid("charlie")];

        // when (操作):
        let failed = fan_out(&pusher, &targets, "frame").await;

        // then (期待する結果): 全員に順番どおり届き、失敗なし
        assert!(failed.is_empty());
    }

    #[tokio::test]
    async fn test_fan_out_isolates_failures() {
        // テスト項目: 1人への配信失敗が他のメンバーへの配信を妨げない
        // given (前提条件): bob だけ接続が死んでいる
        let mut pusher = MockMessagePusher::new();
        pusher
            .expect_push_to()
            .withf(|id, _| id.as_str() == "bob")
            .returning(|id, _| Err(MessagePushError::PushFailed(id.to_string())));
        pusher
            .expect_push_to()
            .withf(|id, _| id.as_str() != "bob")
            .returning(|_, _| Ok(()));
        let targets = vec![uid("alice"), uid("bob"), uid("charlie")];

        // when (操作):
        let failed = fan_out(&pusher, &targets, "frame").await;

        // then (期待する結果): bob のみ失敗として報告される
        assert_eq!(failed, vec![uid("bob")]);
    }

    #[tokio::test]
    async fn test_fan_out_with_no_targets() {
        // テスト項目: 宛先が空でも何も起きない
        let pusher = MockMessagePusher::new();
        let failed = fan_out(&pusher, &[], "frame").await;
        assert!(failed.is_empty());
    }
}
