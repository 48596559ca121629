use crate::common::*;

/// Splits the channels into two interleaved halves.
///
/// For an input of `c` channels, the first output takes the even channels
/// and the second takes the odd channels, each having `c / 2` channels.
/// The channel count must be divisible by 4.
pub fn channel_shuffle(xs: &Tensor) -> Result<(Tensor, Tensor)> {
    let (n, c, h, w) = xs.size4()?;
    ensure!(
        c % 4 == 0,
        "channel shuffle requires the channel count to be divisible by 4, but get {}",
        c
    );

    let xs = xs
        .f_reshape(&[n * c / 2, 2, h * w])?
        .f_permute(&[1, 0, 2])?
        .f_reshape(&[2, -1, c / 2, h, w])?;
    let even = xs.f_select(0, 0)?;
    let odd = xs.f_select(0, 1)?;
    Ok((even, odd))
}
