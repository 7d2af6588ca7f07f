//! メッセージ送信（通知）の実装
//!
//! ## 概要
//!
//! このモジュールは `MessagePusher` trait の具体的な実装を提供します。
//!
//! ## 実装
//!
//! - `room`: RoomRepository に登録された接続ハンドルへ送信する実装

pub mod room;

pub use room::RoomMessagePusher;
