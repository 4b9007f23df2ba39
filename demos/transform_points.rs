use geo_types::Coord;
use libgeo::spatial_ref::{CoordTransform, Projection};

fn main() -> libgeo::errors::Result<()> {
    env_logger::init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("usage: transform_points <from> <to> <x,y>...");
        std::process::exit(1);
    }
    let from = Projection::from_definition(&args[0])?;
    let to = Projection::from_definition(&args[1])?;
    println!("{} -> {}", from.name(), to.name());

    let mut points = Vec::new();
    for arg in &args[2..] {
        let parsed = arg.split_once(',').and_then(|(x, y)| {
            let x: f64 = x.trim().parse().ok()?;
            let y: f64 = y.trim().parse().ok()?;
            Some((x, y))
        });
        match parsed {
            Some((x, y)) => points.push(Coord { x, y }),
            None => eprintln!("skipping '{arg}', expected x,y"),
        }
    }

    let transform = CoordTransform::new(&from, &to)?;
    transform.transform_points(&mut points)?;
    for point in points {
        println!("{:.6} {:.6}", point.x, point.y);
    }
    Ok(())
}
