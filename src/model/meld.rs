use super::*;
use crate::error::ActionError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MeldType {
    Chii,
    Pon,
    Minkan,
    Kakan,
    Ankan,
}

impl MeldType {
    fn marker(&self) -> char {
        match self {
            Self::Chii => 'c',
            Self::Pon => 'p',
            Self::Minkan => 'm',
            Self::Kakan => 'k',
            Self::Ankan => 'a',
        }
    }

    fn from_marker(c: char) -> Option<Self> {
        Some(match c {
            'c' => Self::Chii,
            'p' => Self::Pon,
            'm' => Self::Minkan,
            'k' => Self::Kakan,
            'a' => Self::Ankan,
            _ => return None,
        })
    }

    #[inline]
    pub fn is_kan(&self) -> bool {
        matches!(self, Self::Minkan | Self::Kakan | Self::Ankan)
    }
}

// 副露 (鳴きの文字列を一度だけ解析した構造)
// tilesは文字列中の順番, markerは記号の直後にある牌のindex
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meld {
    pub meld_type: MeldType,
    pub tiles: Vec<Tile>,
    pub marker: usize,
}

impl Meld {
    pub fn parse(s: &str) -> Result<Self, ActionError> {
        let err = || ActionError::Malformed(s.to_string());
        let mut meld_type = None;
        let mut marker = 0;
        let mut tiles = vec![];
        let bytes = s.as_bytes();
        let mut i = 0;
        while i < bytes.len() {
            let c = bytes[i] as char;
            if c.is_ascii_digit() {
                let d = *bytes.get(i + 1).ok_or_else(err)? as char;
                if !d.is_ascii_digit() {
                    return Err(err());
                }
                let id = (c as u8 - b'0') * 10 + (d as u8 - b'0');
                let t = Tile::new(id)?;
                if t.is_none() {
                    return Err(err());
                }
                tiles.push(t);
                i += 2;
            } else {
                if meld_type.is_some() {
                    return Err(err());
                }
                meld_type = Some(MeldType::from_marker(c).ok_or_else(err)?);
                marker = tiles.len();
                i += 1;
            }
        }

        let meld_type = meld_type.ok_or_else(err)?;
        let n = match meld_type {
            MeldType::Chii | MeldType::Pon => 3,
            _ => 4,
        };
        let marker_ok = match meld_type {
            MeldType::Chii => marker == 0,
            MeldType::Ankan => marker == 3,
            _ => marker < 3,
        };
        if tiles.len() != n || !marker_ok {
            return Err(err());
        }

        Ok(Self {
            meld_type,
            tiles,
            marker,
        })
    }

    pub fn from_action(act: &Action) -> Result<Self, ActionError> {
        Self::parse(&act.action_string)
    }

    #[inline]
    pub fn is_open(&self) -> bool {
        self.meld_type != MeldType::Ankan
    }

    // 鳴いた牌を捨てた席の相対位置 (下家:1, 対面:2, 上家:3) 暗槓は0
    pub fn rel(&self) -> usize {
        match self.meld_type {
            MeldType::Ankan => 0,
            MeldType::Chii => 3,
            _ => self.marker + 1,
        }
    }

    pub fn called_tile(&self) -> Option<Tile> {
        if self.is_open() {
            self.tiles.get(self.marker).copied()
        } else {
            None
        }
    }

    // 赤5を区別しない代表牌 (チーの場合は鳴いた牌)
    #[inline]
    pub fn base_tile(&self) -> Tile {
        self.tiles[0].to_normal()
    }

    // 鳴きにより手牌から出ていった牌 (鳴いた牌を除く)
    // 加槓は加えた牌(末尾)を含む
    pub fn hand_tiles(&self) -> Vec<Tile> {
        match self.meld_type {
            MeldType::Ankan => self.tiles.clone(),
            _ => self
                .tiles
                .iter()
                .enumerate()
                .filter(|&(i, _)| i != self.marker)
                .map(|(_, &t)| t)
                .collect(),
        }
    }
}

impl std::str::FromStr for Meld {
    type Err = ActionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Meld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, t) in self.tiles.iter().enumerate() {
            if i == self.marker {
                write!(f, "{}", self.meld_type.marker())?;
            }
            write!(f, "{}", t.id())?;
        }
        Ok(())
    }
}

#[test]
fn test_meld_parse() {
    let m = Meld::parse("41p4141").unwrap();
    assert_eq!(m.meld_type, MeldType::Pon);
    assert_eq!(m.rel(), 2);
    assert_eq!(m.called_tile(), Tile::new(41).ok());
    assert!(m.is_open());

    let m = Meld::parse("151515a51").unwrap();
    assert_eq!(m.meld_type, MeldType::Ankan);
    assert!(!m.is_open());
    assert_eq!(m.called_tile(), None);
    assert_eq!(m.hand_tiles().len(), 4);
    assert_eq!(m.base_tile(), Tile::new(15).unwrap());

    let m = Meld::parse("c275226").unwrap();
    assert_eq!(m.rel(), 3);
    assert_eq!(m.called_tile(), Tile::new(27).ok());
    assert_eq!(m.hand_tiles(), vec![Tile::new(52).unwrap(), Tile::new(26).unwrap()]);

    let m = Meld::parse("47k474747").unwrap();
    assert_eq!(m.meld_type, MeldType::Kakan);
    assert_eq!(m.rel(), 2);
    assert_eq!(m.hand_tiles().len(), 3);
}

#[test]
fn test_meld_invalid() {
    assert!(Meld::parse("414141").is_err());
    assert!(Meld::parse("41p41").is_err());
    assert!(Meld::parse("4141p41x").is_err());
    assert!(Meld::parse("41p414").is_err());
    assert!(Meld::parse("a12121212").is_err());
    assert!(Meld::parse("27c5226").is_err());
}

#[test]
fn test_meld_reencode() {
    for s in ["41p4141", "p414141", "4141p41", "1212m1212", "121212a12", "c275226", "47k474747"] {
        assert_eq!(Meld::parse(s).unwrap().to_string(), s);
    }
}
