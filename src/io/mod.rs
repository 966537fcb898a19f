// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! I/O operations for project documents and photos.

pub mod gateway;
pub mod photos;
pub mod serialization;

pub use gateway::{JsonFileGateway, MemoryGateway, PersistenceGateway};
pub use photos::{DirPhotoStore, MemoryPhotoStore, PhotoStore};
