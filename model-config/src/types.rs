use crate::common::*;

/// The height and width of an input frame in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FrameSize {
    pub h: usize,
    pub w: usize,
}

impl FrameSize {
    pub fn new(h: usize, w: usize) -> Self {
        Self { h, w }
    }
}

impl From<(usize, usize)> for FrameSize {
    fn from((h, w): (usize, usize)) -> Self {
        Self { h, w }
    }
}

impl Display for FrameSize {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.h, self.w)
    }
}
