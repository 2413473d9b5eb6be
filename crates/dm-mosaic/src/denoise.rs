use dm_core::frame::FrameBuffer;
use rayon::prelude::*;

/// Filtre médian 3×3 par canal, parallélisé par rangée.
///
/// La fenêtre est tronquée aux bords de l'image — pas de padding ni de
/// réflexion, la taille de fenêtre varie donc sur le pourtour. Médianes
/// calculées sur les échantillons 8 bits ; sur fenêtre paire, la médiane
/// haute (`sorted[n/2]`). L'entrée n'est jamais modifiée, la sortie est
/// un buffer neuf. L'alpha du pixel central est recopié tel quel.
///
/// # Example
/// ```
/// use dm_core::frame::FrameBuffer;
/// use dm_mosaic::denoise::median3x3;
/// let src = FrameBuffer::new(8, 8);
/// let out = median3x3(&src);
/// assert_eq!((out.width, out.height), (8, 8));
/// ```
#[must_use]
pub fn median3x3(src: &FrameBuffer) -> FrameBuffer {
    let width = src.width;
    let height = src.height;
    let mut out = FrameBuffer::new(width, height);
    let stride = src.stride();

    out.data
        .par_chunks_exact_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            let mut rs = [0u8; 9];
            let mut gs = [0u8; 9];
            let mut bs = [0u8; 9];

            for x in 0..width {
                let mut n = 0usize;
                for dy in -1i64..=1 {
                    let sy = i64::from(y) + dy;
                    if sy < 0 || sy >= i64::from(height) {
                        continue;
                    }
                    for dx in -1i64..=1 {
                        let sx = i64::from(x) + dx;
                        if sx < 0 || sx >= i64::from(width) {
                            continue;
                        }
                        let (r, g, b, _) = src.pixel(sx as u32, sy as u32);
                        rs[n] = r;
                        gs[n] = g;
                        bs[n] = b;
                        n += 1;
                    }
                }

                let (_, _, _, a) = src.pixel(x, y);
                let idx = x as usize * 4;
                row[idx] = median(&mut rs[..n]);
                row[idx + 1] = median(&mut gs[..n]);
                row[idx + 2] = median(&mut bs[..n]);
                row[idx + 3] = a;
            }
        });

    out
}

#[inline]
fn median(samples: &mut [u8]) -> u8 {
    samples.sort_unstable();
    samples[samples.len() / 2]
}
