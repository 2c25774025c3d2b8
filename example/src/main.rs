use pullkit::prelude::*;
use std::thread;

/// Collatz sequence from `start`, produced on its own thread.
fn collatz(start: u64) -> Generator<u64> {
    Generator::spawn(move |y: &mut Yielder<u64>| {
        let mut n = start;
        y.send(n)?;
        while n != 1 {
            n = if n % 2 == 0 { n / 2 } else { 3 * n + 1 };
            y.send(n)?;
        }
        Ok(())
    })
}

pub fn main() -> anyhow::Result<()> {
    let _guard = LoggerConfig::from_env().init()?;

    // Stopped early: the producer would run forever otherwise.
    let mut naturals = Generator::spawn(|y: &mut Yielder<u64>| {
        let mut n = 0;
        loop {
            y.send(n)?;
            n += 1;
        }
    });
    naturals.each(|n| {
        tracing::info!("natural: {}", n);
        *n >= 4
    });
    naturals.stop();

    // One generator read by three threads at their own pace.
    let readers: Vec<_> = collatz(27)
        .tee_n(3)
        .into_iter()
        .enumerate()
        .map(|(id, mut c)| {
            thread::spawn(move || {
                let mut steps = 0_usize;
                let mut peak = 0_u64;
                while c.next() {
                    steps += 1;
                    peak = peak.max(*c.value());
                }
                tracing::info!("reader {}: {} steps, peak {}", id, steps, peak);
                (steps, peak)
            })
        })
        .collect();

    for r in readers {
        if let Ok((steps, peak)) = r.join() {
            println!("collatz(27): {steps} values, peak {peak}");
        }
    }

    let (left, right) = from_iter(["a", "b", "c"]).tee();
    let mut shifted = left;
    shifted.next();
    for (next, cur) in shifted.zip(right).into_std_iter() {
        println!("{cur} -> {next}");
    }

    Ok(())
}
