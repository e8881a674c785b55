//! Toll of ALDR trees across depths, against the FLDR and Knuth–Yao endpoints.
//!
//! Run with `RUST_LOG=debug` to see construction details.

use aldr::{
    expected_bits, fldr_toll, shannon_entropy, toll_curve, uniform_aldr_tolls, CurveOptions,
    FlatSampler, WeightVector,
};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let weights = WeightVector::new(vec![2, 3, 5, 7, 11, 13])?;
    let curve = toll_curve(&weights, &CurveOptions::default())?;

    println!("weights: {:?}", weights.as_slice());
    println!("entropy: {:.4} bits", shannon_entropy(&weights));
    println!(
        "FLDR toll: {:.4} @ depth {} (closed form {:.4})",
        curve.fldr_toll,
        curve.min_depth,
        fldr_toll(&weights)?
    );
    for &(k, toll) in &curve.points {
        println!("  K={k:3}  toll={toll:.4}");
    }
    println!("KY toll: {:.4} @ depth {}", curve.ky_toll, curve.ky_depth);
    match curve.first_depth_below(2.0) {
        Some(depth) => println!("toll < 2 from depth {depth}"),
        None => println!("toll never drops below 2"),
    }

    let flat = FlatSampler::aldr(&weights)?;
    println!();
    println!(
        "flat ALDR sampler: K={} {} bytes, {:.4} bits per sample",
        flat.depth_bound(),
        flat.bytes(),
        expected_bits(&flat.to_tree())?
    );

    println!();
    println!("uniform over 11 outcomes:");
    for (k, toll) in uniform_aldr_tolls(11)? {
        println!("  K={k:3}  toll={toll:.4}");
    }
    Ok(())
}
