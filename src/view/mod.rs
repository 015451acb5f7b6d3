//! 收藏列表视图

pub mod collection;

pub use collection::{CollectionSnapshot, PersistedCollectionView};
