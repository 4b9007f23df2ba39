use libgeo::raster::{tags, GeoTiffFields, Tiff};
use libgeo::version::VersionInfo;
use libgeo::GeoTransformEx;

fn main() -> libgeo::errors::Result<()> {
    env_logger::init();
    let Some(path) = std::env::args().nth(1) else {
        eprintln!("usage: tiff_info <file.tif>");
        std::process::exit(1);
    };
    println!("{}", VersionInfo::TIFF_VERSION);

    let tiff = Tiff::open(&path)?;
    let (width, length) = tiff.raster_size()?;
    println!("{}: {width}x{length}", tiff.file_name());
    println!("directories: {}", tiff.directory_count());
    if let Some((tile_width, tile_length)) = tiff.tile_dimensions()? {
        println!(
            "tiles: {} of {tile_width}x{tile_length}, {} bytes each",
            tiff.tile_count(),
            tiff.tile_size()
        );
    } else {
        println!(
            "strips: {} of {} rows, {} bytes each",
            tiff.strip_count(),
            tiff.rows_per_strip()?,
            tiff.strip_size()
        );
    }
    if let Some(bits) = tiff.get_field::<u16>(tags::BITS_PER_SAMPLE)? {
        println!("bits per sample: {bits}");
    }
    if let Some(software) = tiff.get_field_string(tags::SOFTWARE)? {
        println!("software: {software}");
    }
    if let Some(date_time) = tiff.date_time()? {
        println!("date/time: {date_time}");
    }

    if let Some(transform) = tiff.geo_transform()? {
        println!("geo transform: {transform:?}");
        let (x, y) = transform.apply(width as f64, length as f64);
        println!("lower right corner: ({x}, {y})");
    }
    if let Some(keys) = tiff.geo_key_directory()? {
        println!("geo keys: {}", keys.len().saturating_sub(4) / 4);
    }
    if let Some(citation) = tiff.geo_ascii_params()? {
        println!("citation: {}", citation.trim_end_matches('|'));
    }
    if let Some(nodata) = tiff.nodata()? {
        println!("nodata: {nodata}");
    }
    Ok(())
}
