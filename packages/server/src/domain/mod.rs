//! Domain layer: value objects, entities and the interfaces the use cases
//! depend on. Concrete implementations live in the infrastructure layer.

pub mod entity;
pub mod error;
pub mod pusher;
pub mod repository;
pub mod value_object;

pub use entity::{Channel, DepartStatus, Departure, JoinSnapshot, Registry, User};
pub use error::{MessagePushError, RegistryError, ValueObjectError};
pub use pusher::{MessagePusher, PusherChannel};
pub use repository::RelayRepository;
pub use value_object::{
    ChannelName, ChannelNameFactory, Timestamp, UserId, UserIdFactory,
};
