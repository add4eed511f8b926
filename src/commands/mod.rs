// SPDX-License-Identifier: MIT
pub mod chat;
pub mod export;
pub mod info;
pub mod setup;
