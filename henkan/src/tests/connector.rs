use crate::data_manager::{DataManager, write_data_file};
use crate::dictionary::connector::*;

const MATRIX_DEF: &str = include_str!("./resources/matrix.def");

fn matrix() -> MatrixConnector {
    MatrixConnector::from_reader(MATRIX_DEF.as_bytes()).unwrap()
}

fn all_pairs(size: u16) -> impl DoubleEndedIterator<Item = (u16, u16)> {
    (0..size).flat_map(move |l| (0..size).map(move |r| (l, r)))
}

/// 接続コスト行列の読み込みと取得機能のテスト
#[test]
fn test_matrix() {
    let conn = matrix();
    assert_eq!(conn.num_left(), 12);
    assert_eq!(conn.num_right(), 12);
    assert_eq!(conn.cost(0, 0), 1000);
    assert_eq!(conn.cost(0, 1), 200);
    assert_eq!(conn.cost(1, 1), 1011);
    assert_eq!(conn.cost(3, 5), INVALID_COST);
    assert_eq!(conn.cost(10, 2), INVALID_COST);
    assert_eq!(conn.cost(11, 1), 1111);
    assert_eq!(conn.cost(11, 3), 200);
}

#[test]
fn test_round_trip() {
    let matrix = matrix();
    let bytes = ConnectorBuilder::new().build(&matrix).unwrap();
    let conn = Connector::new(&bytes, 64).unwrap();
    assert_eq!(conn.resolution(), 1);
    assert_eq!(conn.num_left(), 12);
    for (l, r) in all_pairs(12) {
        assert_eq!(conn.transition_cost(l, r), matrix.cost(l, r), "({l}, {r})");
    }
}

#[test]
fn test_quantized_round_trip() {
    let matrix = matrix();
    let bytes = ConnectorBuilder::new()
        .resolution(10)
        .unwrap()
        .build(&matrix)
        .unwrap();
    let conn = Connector::new(&bytes, 64).unwrap();
    assert_eq!(conn.resolution(), 10);
    for l in 0..12 {
        assert_eq!(conn.default_cost(l), 200);
    }
    for (l, r) in all_pairs(12) {
        let cost = matrix.cost(l, r);
        let expected = if cost == conn.default_cost(l) || cost == INVALID_COST {
            cost
        } else {
            (cost + 5) / 10 * 10
        };
        assert_eq!(conn.transition_cost(l, r), expected, "({l}, {r})");
    }
}

#[test]
fn test_cache_is_transparent() {
    let bytes = ConnectorBuilder::new().build(&matrix()).unwrap();
    let conn = Connector::new(&bytes, 4).unwrap();
    // Two passes over every pair so that the small cache keeps evicting.
    for _ in 0..2 {
        for (l, r) in all_pairs(12) {
            assert_eq!(conn.transition_cost(l, r), conn.lookup_cost(l, r));
        }
    }
    for (l, r) in all_pairs(12).rev() {
        assert_eq!(conn.transition_cost(l, r), conn.lookup_cost(l, r));
    }
}

#[test]
fn test_concurrent_lookups() {
    let matrix = matrix();
    let bytes = ConnectorBuilder::new()
        .resolution(10)
        .unwrap()
        .build(&matrix)
        .unwrap();
    let conn = Connector::new(&bytes, 8).unwrap();
    let expected: Vec<i32> = all_pairs(12).map(|(l, r)| conn.lookup_cost(l, r)).collect();

    std::thread::scope(|s| {
        for t in 0..4u16 {
            let conn = &conn;
            let expected = &expected;
            s.spawn(move || {
                for round in 0..50u16 {
                    let flip = (round + t) % 2 == 1;
                    for (l, r) in all_pairs(12) {
                        let (l, r) = if flip { (r, l) } else { (l, r) };
                        let i = usize::from(l) * 12 + usize::from(r);
                        assert_eq!(conn.transition_cost(l, r), expected[i]);
                    }
                }
            });
        }
    });
}

#[test]
fn test_clear_cache_keeps_results() {
    let bytes = ConnectorBuilder::new().build(&matrix()).unwrap();
    let conn = Connector::new(&bytes, 16).unwrap();
    let first: Vec<i32> = all_pairs(12)
        .map(|(l, r)| conn.transition_cost(l, r))
        .collect();
    conn.clear_cache();
    let second: Vec<i32> = all_pairs(12)
        .map(|(l, r)| conn.transition_cost(l, r))
        .collect();
    assert_eq!(first, second);
}

#[test]
fn test_from_data_file() {
    let matrix = matrix();
    let bytes = ConnectorBuilder::new().build(&matrix).unwrap();

    let mut file = tempfile::NamedTempFile::new().unwrap();
    write_data_file(&bytes, vec![], file.as_file_mut()).unwrap();

    let data_manager = DataManager::from_path(file.path()).unwrap();
    assert_eq!(data_manager.connection_data().unwrap(), bytes.as_slice());
    let conn = Connector::from_data_manager(&data_manager).unwrap();
    assert_eq!(conn.metadata().magic, CONNECTOR_MAGIC);
    for (l, r) in all_pairs(12) {
        assert_eq!(conn.transition_cost(l, r), matrix.cost(l, r));
    }
}
