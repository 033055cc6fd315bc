//! Value objects for the relay domain.
//!
//! ユーザー ID とチャンネル名は不変条件（非空・長さ上限）を型で保証します。
//! 生成系（Factory）はサーバー側で割り当てる識別子を乱数から作ります。

use uuid::Uuid;

use super::error::ValueObjectError;

/// Maximum length of a user identifier.
const USER_ID_MAX_LEN: usize = 64;

/// Maximum length of a channel name.
const CHANNEL_NAME_MAX_LEN: usize = 128;

/// Opaque identifier of a connected user. Generated by the server, never
/// chosen by the client; unique among currently-connected users.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UserId(String);

impl UserId {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyUserId);
        }
        if value.len() > USER_ID_MAX_LEN {
            return Err(ValueObjectError::UserIdTooLong(value.len()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for UserId {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces fresh [`UserId`]s: 32 hex characters of randomness, effectively
/// collision-free within the operational scale of a single process.
pub struct UserIdFactory;

impl UserIdFactory {
    pub fn generate() -> UserId {
        UserId(Uuid::new_v4().simple().to_string())
    }
}

/// Name of a channel: client-supplied on the first join, or generated when
/// the join carries no name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChannelName(String);

impl ChannelName {
    pub fn new(value: String) -> Result<Self, ValueObjectError> {
        if value.is_empty() {
            return Err(ValueObjectError::EmptyChannelName);
        }
        if value.len() > CHANNEL_NAME_MAX_LEN {
            return Err(ValueObjectError::ChannelNameTooLong(value.len()));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl TryFrom<String> for ChannelName {
    type Error = ValueObjectError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl std::fmt::Display for ChannelName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Produces generated channel names, same shape as user identifiers.
pub struct ChannelNameFactory;

impl ChannelNameFactory {
    pub fn generate() -> ChannelName {
        ChannelName(Uuid::new_v4().simple().to_string())
    }
}

/// Unix timestamp in milliseconds (UTC).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    pub fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_id_validation() {
        // テスト項目: UserId の不変条件（非空・長さ上限）が検証される
        assert!(UserId::new("alice".to_string()).is_ok());
        assert_eq!(
            UserId::new(String::new()),
            Err(ValueObjectError::EmptyUserId)
        );
        assert_eq!(
            UserId::new("x".repeat(65)),
            Err(ValueObjectError::UserIdTooLong(65))
        );
    }

    #[test]
    fn test_channel_name_validation() {
        // テスト項目: ChannelName の不変条件が検証される
        assert!(ChannelName::new("lobby".to_string()).is_ok());
        assert_eq!(
            ChannelName::new(String::new()),
            Err(ValueObjectError::EmptyChannelName)
        );
        assert_eq!(
            ChannelName::new("x".repeat(129)),
            Err(ValueObjectError::ChannelNameTooLong(129))
        );
    }

    #[test]
    fn test_user_id_factory_generates_unique_ids() {
        // テスト項目: 生成される UserId は 32 文字の16進で、毎回異なる
        // given (前提条件) / when (操作):
        let first = UserIdFactory::generate();
        let second = UserIdFactory::generate();

        // then (期待する結果):
        assert_eq!(first.as_str().len(), 32);
        assert!(first.as_str().chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(first, second);
    }

    #[test]
    fn test_channel_name_factory_generates_valid_names() {
        // テスト項目: 生成されるチャンネル名はそのまま ChannelName として妥当
        let generated = ChannelNameFactory::generate();
        assert!(ChannelName::new(generated.as_str().to_string()).is_ok());
        assert_eq!(generated.as_str().len(), 32);
    }

    #[test]
    fn test_timestamp_holds_value() {
        // テスト項目: Timestamp が値を保持する
        let ts = Timestamp::new(1_700_000_000_000);
        assert_eq!(ts.value(), 1_700_000_000_000);
    }
}
