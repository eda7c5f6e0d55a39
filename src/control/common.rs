use crate::model::*;

// baseから見たtargetの相対位置 (下家:1, 対面:2, 上家:3)
#[inline]
pub fn calc_seat_offset(base: Seat, target: Seat) -> usize {
    (target + SEAT - base) % SEAT
}

// 赤5と通常の5を区別した枚数
pub fn count_tile(tiles: &[Tile], t: Tile) -> usize {
    tiles.iter().filter(|&&x| x == t).count()
}

// 手牌に存在するtと同種の牌 (通常の5,赤5の順) 重複なし
pub fn tiles_with_red5(tiles: &[Tile], t: Tile) -> Vec<Tile> {
    let t = t.to_normal();
    let mut v = vec![];
    if tiles.contains(&t) {
        v.push(t);
    }
    if t.is_suit() && t.rank() == 5 {
        let red = Tile::from_index(t.ti(), 0);
        if tiles.contains(&red) {
            v.push(red);
        }
    }
    v
}

#[test]
fn test_seat_offset() {
    assert_eq!(calc_seat_offset(0, 1), 1);
    assert_eq!(calc_seat_offset(1, 0), 3);
    assert_eq!(calc_seat_offset(3, 1), 2);
}

#[test]
fn test_tiles_with_red5() {
    let hand = Deck::parse("055m4p").unwrap();
    let five = Tile::from_symbol("5m").unwrap();
    assert_eq!(
        tiles_with_red5(hand.tiles(), five),
        vec![five, Tile::from_symbol("0m").unwrap()]
    );
    assert_eq!(count_tile(hand.tiles(), five), 2);
    assert!(tiles_with_red5(hand.tiles(), Tile::from_symbol("5p").unwrap()).is_empty());
}
