//! LOUDSトライのビルダー
//!
//! 登録されたバイト列から、レベル順のビット列で表現したトライのイメージを作ります。
//!
//! ```text
//! louds_bytes: u32 | terminal_bytes: u32 | label_bits: u32 | label_bytes: u32
//! louds bits    : "10" for the super root, then per node "1" * children + "0"
//! terminal bits : one bit per node in BFS order (root included)
//! labels        : one byte per node in BFS order (0 for the root)
//! ```
//!
//! 各ビット列は4バイト境界まで0で埋められます。
//! キーのIDは、幅優先順で数えた終端ノードの順位です。

use hashbrown::HashMap;

use crate::succinct::BitVectorBuilder;
use crate::utils::round_up_4;

/// バイト列にIDを割り当てるトライのビルダー
pub trait TrieBuilder {
    /// キーを追加します。同じキーを複数回追加しても1つにまとめられます。
    fn add(&mut self, key: &[u8]);

    /// トライを構築します。
    ///
    /// # Panics
    ///
    /// ビット列やラベルの大きさが `u32` に収まらない場合。
    fn build(&mut self);

    /// 構築済みのトライでのキーのIDを返します。
    fn id(&self, key: &[u8]) -> Option<u32>;

    /// 構築済みのトライのイメージを返します。
    fn image(&self) -> &[u8];
}

/// LOUDSトライのビルダー
#[derive(Debug, Default)]
pub struct LoudsTrieBuilder {
    keys: Vec<Vec<u8>>,
    ids: HashMap<Vec<u8>, u32>,
    image: Vec<u8>,
    built: bool,
}

impl LoudsTrieBuilder {
    /// 空のビルダーを作成します。
    pub fn new() -> Self {
        Self::default()
    }

    /// 登録された異なるキーの数を返します。構築前は0です。
    pub fn num_keys(&self) -> usize {
        self.ids.len()
    }
}

impl TrieBuilder for LoudsTrieBuilder {
    fn add(&mut self, key: &[u8]) {
        assert!(!self.built, "cannot add a key after build");
        self.keys.push(key.to_vec());
    }

    fn build(&mut self) {
        assert!(!self.built, "the trie is already built");
        let mut keys = std::mem::take(&mut self.keys);
        keys.sort_unstable();
        keys.dedup();

        let mut louds = BitVectorBuilder::new();
        let mut terminal = BitVectorBuilder::new();
        let mut labels = vec![];
        louds.push(true);
        louds.push(false);

        // Each node covers the keys in `start..end` sharing a prefix of length `depth`.
        let mut queue = std::collections::VecDeque::new();
        queue.push_back((0, keys.len(), 0, 0u8));
        let mut next_id = 0;
        while let Some((start, end, depth, label)) = queue.pop_front() {
            labels.push(label);
            let mut i = start;
            if i < end && keys[i].len() == depth {
                terminal.push(true);
                self.ids.insert(keys[i].clone(), next_id);
                next_id += 1;
                i += 1;
            } else {
                terminal.push(false);
            }
            while i < end {
                let c = keys[i][depth];
                let mut j = i + 1;
                while j < end && keys[j][depth] == c {
                    j += 1;
                }
                louds.push(true);
                queue.push_back((i, j, depth + 1, c));
                i = j;
            }
            louds.push(false);
        }

        let louds = louds.into_padded_bytes();
        let terminal = terminal.into_padded_bytes();
        let label_bytes = labels.len();
        labels.resize(round_up_4(label_bytes), 0);

        let mut image = vec![];
        for n in [louds.len(), terminal.len(), 8, label_bytes] {
            push_header_field(&mut image, n);
        }
        image.extend_from_slice(&louds);
        image.extend_from_slice(&terminal);
        image.extend_from_slice(&labels);

        log::debug!(
            "built LOUDS trie: {} keys, {} nodes, {} bytes",
            next_id,
            label_bytes,
            image.len()
        );
        self.image = image;
        self.built = true;
    }

    fn id(&self, key: &[u8]) -> Option<u32> {
        self.ids.get(key).copied()
    }

    fn image(&self) -> &[u8] {
        &self.image
    }
}

/// ヘッダの1フィールドを `u32` のリトルエンディアンで追加します。
fn push_header_field(image: &mut Vec<u8>, n: usize) {
    let n = u32::try_from(n)
        .unwrap_or_else(|_| panic!("{n} does not fit in a 32-bit trie header field"));
    image.extend_from_slice(&n.to_le_bytes());
}
