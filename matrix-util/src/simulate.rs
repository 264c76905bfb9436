use log::info;
use rand::SeedableRng;
use rand_distr::{Distribution, Gamma, Poisson};
use rayon::prelude::*;

pub struct SimArgs {
    pub rows: usize,
    pub cols: usize,
    /// average count per cell
    pub mean: f64,
    /// Gamma shape of the row-specific rates; smaller is more dispersed
    pub overdisp: f64,
    pub rseed: u64,
}

/// Sample a sparse count matrix and return its non-zero triplets
/// sorted by column, then row
///
/// ```text
/// lambda(i) ~ Gamma(overdisp, mean / overdisp)
/// Y(i,j) ~ Poisson(lambda(i))
/// ```
///
pub fn generate_sparse_counts(args: &SimArgs) -> anyhow::Result<Vec<(usize, usize, f64)>> {
    if args.rows == 0 || args.cols == 0 {
        anyhow::bail!("need at least one row and one column");
    }
    if !(args.mean > 0.0 && args.overdisp > 0.0) {
        anyhow::bail!("mean and overdispersion must be positive");
    }

    let mut rng = rand::rngs::StdRng::seed_from_u64(args.rseed);
    let gamma = Gamma::new(args.overdisp, args.mean / args.overdisp)
        .map_err(|e| anyhow::anyhow!("gamma: {}", e))?;
    let lambda: Vec<f64> = (0..args.rows).map(|_| gamma.sample(&mut rng)).collect();

    let pois = lambda
        .iter()
        .map(|&lam| {
            if lam > 0.0 {
                Poisson::new(lam)
                    .map(Some)
                    .map_err(|e| anyhow::anyhow!("poisson: {}", e))
            } else {
                Ok(None)
            }
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    // one generator per column keeps the result independent of threads
    let triplets: Vec<(usize, usize, f64)> = (0..args.cols)
        .into_par_iter()
        .map(|j| {
            let mut rng = rand::rngs::StdRng::seed_from_u64(args.rseed.wrapping_add(j as u64 + 1));
            pois.iter()
                .enumerate()
                .filter_map(|(i, p)| {
                    let y: f64 = p.as_ref().map_or(0.0, |p| p.sample(&mut rng));
                    (y > 0.0).then_some((i, j, y))
                })
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .into_iter()
        .flatten()
        .collect();

    info!(
        "sampled {} non-zero elements in {} x {}",
        triplets.len(),
        args.rows,
        args.cols
    );

    Ok(triplets)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reproducible_counts() -> anyhow::Result<()> {
        let args = SimArgs {
            rows: 20,
            cols: 15,
            mean: 1.0,
            overdisp: 2.0,
            rseed: 7,
        };

        let first = generate_sparse_counts(&args)?;
        let second = generate_sparse_counts(&args)?;
        assert_eq!(first, second);

        assert!(first.iter().all(|&(i, j, y)| i < 20 && j < 15 && y > 0.0));
        assert!(first
            .windows(2)
            .all(|w| (w[0].1, w[0].0) < (w[1].1, w[1].0)));
        Ok(())
    }

    #[test]
    fn test_bad_args() {
        let args = SimArgs {
            rows: 0,
            cols: 3,
            mean: 1.0,
            overdisp: 1.0,
            rseed: 1,
        };
        assert!(generate_sparse_counts(&args).is_err());
    }
}
