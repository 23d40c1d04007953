#[derive(Debug, Clone, Default)]
pub struct QuadratureDecoder {
    state: u8,
    quarter_steps: i8,
}

const TRANSITIONS: [i8; 16] = [0, -1, 1, 0, 1, 0, 0, -1, -1, 0, 0, 1, 0, 1, -1, 0];

impl QuadratureDecoder {
    pub fn new(a: bool, b: bool) -> Self {
        Self {
            state: Self::encode(a, b),
            quarter_steps: 0,
        }
    }

    fn encode(a: bool, b: bool) -> u8 {
        (u8::from(a) << 1) | u8::from(b)
    }

    pub fn update(&mut self, a: bool, b: bool) -> i32 {
        let next = Self::encode(a, b);
        if next == self.state {
            return 0;
        }

        let index = usize::from((self.state << 2) | next);
        self.state = next;
        self.quarter_steps += TRANSITIONS[index];

        if self.quarter_steps >= 4 {
            self.quarter_steps = 0;
            1
        } else if self.quarter_steps <= -4 {
            self.quarter_steps = 0;
            -1
        } else {
            0
        }
    }
}
