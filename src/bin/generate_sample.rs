use anyhow::Result;
use rust_xlsxwriter::Workbook;

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5)).rotate_left(7).wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn uniform(&mut self, lo: f64, hi: f64) -> f64 {
        lo + (hi - lo) * self.next_f64()
    }
}

/// FACE-style experiments: (site, ecosystem, latitude, longitude).
const SITES: &[(&str, &str, f64, f64)] = &[
    ("Duke", "forest", 35.97, -79.09),
    ("ORNL", "forest", 35.90, -84.33),
    ("Rhinelander", "forest", 45.67, -89.63),
    ("BioCON", "grassland", 45.40, -93.20),
    ("Jasper Ridge", "grassland", 37.40, -122.24),
    ("SwissFACE", "grassland", 47.44, 8.68),
];

const HEADER: [&str; 8] = [
    "Study",
    "Site",
    "Ecosystem",
    "Latitude",
    "Longitude",
    "Depth (cm)",
    "SOC.elev (g/m2)",
    "SOC.amb (g/m2)",
];

fn main() -> Result<()> {
    let mut rng = SimpleRng::new(42);
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("combined")?;

    for (col, name) in HEADER.iter().enumerate() {
        sheet.write_string(0, col as u16, *name)?;
    }

    let depths = [10.0, 20.0, 30.0];
    let mut row: u32 = 1;
    let mut study = 1;
    for &(site, ecosystem, lat, lon) in SITES {
        for &depth in &depths {
            let ambient = rng.uniform(800.0, 4000.0) / (depth / 10.0);
            let elevated = ambient * rng.uniform(0.85, 1.25);

            sheet.write_string(row, 0, format!("S{study:03}"))?;
            sheet.write_string(row, 1, site)?;
            sheet.write_string(row, 2, ecosystem)?;
            sheet.write_number(row, 3, lat)?;
            sheet.write_number(row, 4, lon)?;
            sheet.write_number(row, 5, depth)?;

            // Every seventh record lost its elevated measurement.
            if row % 7 == 0 {
                sheet.write_string(row, 6, "NA")?;
            } else {
                sheet.write_number(row, 6, (elevated * 10.0).round() / 10.0)?;
            }
            sheet.write_number(row, 7, (ambient * 10.0).round() / 10.0)?;

            row += 1;
            study += 1;
        }
        // Blank separator row between sites.
        if site == "Rhinelander" {
            row += 1;
        }
    }

    // A record with a zero control value: its ratio is undefined.
    sheet.write_string(row, 0, format!("S{study:03}"))?;
    sheet.write_string(row, 1, "Nevada")?;
    sheet.write_string(row, 2, "desert")?;
    sheet.write_number(row, 3, 36.82)?;
    sheet.write_number(row, 4, -115.92)?;
    sheet.write_number(row, 5, 10.0)?;
    sheet.write_number(row, 6, 412.0)?;
    sheet.write_number(row, 7, 0.0)?;

    let output_path = "soilC.xlsx";
    workbook.save(output_path)?;

    println!("Wrote {} records to {output_path} (sheet 'combined')", study);
    Ok(())
}
