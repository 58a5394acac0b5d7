//! henkan のテストモジュール群
//!
//! 接続コスト行列の読み書き、システム辞書のビルド、データファイルの往復など、
//! 複数のモジュールにまたがる動作を検証します。

mod connector;
