use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Button {
    One,
    Two,
    Three,
    Four,
}

impl Button {
    pub const ALL: [Button; 4] = [Self::One, Self::Two, Self::Three, Self::Four];

    pub fn number(self) -> u8 {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Three => 3,
            Self::Four => 4,
        }
    }

    pub fn index(self) -> usize {
        usize::from(self.number() - 1)
    }

    pub fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::One),
            2 => Some(Self::Two),
            3 => Some(Self::Three),
            4 => Some(Self::Four),
            _ => None,
        }
    }
}

impl fmt::Display for Button {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Stage {
    Develop,
    StopBath,
    Fix,
    Wash,
}

impl Stage {
    pub const ORDER: [Stage; 4] = [Self::Develop, Self::StopBath, Self::Fix, Self::Wash];

    pub fn button(self) -> Button {
        match self {
            Self::Develop => Button::One,
            Self::StopBath => Button::Two,
            Self::Fix => Button::Three,
            Self::Wash => Button::Four,
        }
    }

    pub fn from_button(button: Button) -> Self {
        match button {
            Button::One => Self::Develop,
            Button::Two => Self::StopBath,
            Button::Three => Self::Fix,
            Button::Four => Self::Wash,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Develop => "DEVELOP",
            Self::StopBath => "STOP_BATH",
            Self::Fix => "FIX",
            Self::Wash => "WASH",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
