use crate::common::*;

pub use anchor::*;
mod anchor {
    use super::*;

    /// A prior box template in pixels.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(try_from = "(R64, R64)", into = "(R64, R64)")]
    pub struct Anchor {
        w: R64,
        h: R64,
    }

    impl Anchor {
        pub fn new(w: R64, h: R64) -> Result<Self> {
            ensure!(
                w > 0.0 && h > 0.0,
                "anchor size must be positive, but get ({}, {})",
                w,
                h
            );
            Ok(Self { w, h })
        }

        pub fn w(&self) -> R64 {
            self.w
        }

        pub fn h(&self) -> R64 {
            self.h
        }
    }

    impl TryFrom<(R64, R64)> for Anchor {
        type Error = Error;

        fn try_from((w, h): (R64, R64)) -> Result<Self, Self::Error> {
            Self::new(w, h)
        }
    }

    impl From<Anchor> for (R64, R64) {
        fn from(Anchor { w, h }: Anchor) -> Self {
            (w, h)
        }
    }
}

pub use anchors_::*;
mod anchors_ {
    use super::*;

    /// The ordered anchor set handed to the model and the loss function.
    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct Anchors(Vec<Anchor>);

    impl Anchors {
        pub fn new(anchors: Vec<Anchor>) -> Self {
            Self(anchors)
        }

        /// Builds anchors from interleaved `[w0, h0, w1, h1, ...]` values.
        pub fn from_flat(values: &[f64]) -> Result<Self> {
            ensure!(
                values.len() % 2 == 0,
                "expect an even number of anchor values, but get {}",
                values.len()
            );
            let anchors: Vec<_> = values
                .chunks_exact(2)
                .map(|pair| -> Result<_> {
                    let w = R64::try_new(pair[0])
                        .ok_or_else(|| format_err!("anchor width {} is not finite", pair[0]))?;
                    let h = R64::try_new(pair[1])
                        .ok_or_else(|| format_err!("anchor height {} is not finite", pair[1]))?;
                    Anchor::new(w, h)
                })
                .try_collect()?;
            Ok(Self(anchors))
        }

        pub fn as_slice(&self) -> &[Anchor] {
            &self.0
        }

        pub fn len(&self) -> usize {
            self.0.len()
        }

        pub fn is_empty(&self) -> bool {
            self.0.is_empty()
        }

        pub fn iter(&self) -> impl Iterator<Item = &Anchor> {
            self.0.iter()
        }
    }

    impl From<Vec<Anchor>> for Anchors {
        fn from(anchors: Vec<Anchor>) -> Self {
            Self(anchors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchors_from_flat() -> Result<()> {
        let anchors = Anchors::from_flat(&[6.0, 16.0, 8.0, 23.0, 11.0, 32.0])?;
        assert_eq!(anchors.len(), 3);
        assert_eq!(anchors.as_slice()[1].w(), 8.0);
        assert_eq!(anchors.as_slice()[1].h(), 23.0);

        assert!(Anchors::from_flat(&[6.0, 16.0, 8.0]).is_err());
        assert!(Anchors::from_flat(&[6.0, -1.0]).is_err());
        assert!(Anchors::from_flat(&[f64::NAN, 1.0]).is_err());
        Ok(())
    }

    #[test]
    fn anchors_serde() -> Result<()> {
        let anchors: Anchors = serde_json::from_str("[[6, 16], [8, 23]]")?;
        assert_eq!(anchors.len(), 2);
        assert_eq!(serde_json::to_string(&anchors)?, "[[6.0,16.0],[8.0,23.0]]");
        assert!(serde_json::from_str::<Anchors>("[[0, 16]]").is_err());
        Ok(())
    }
}
