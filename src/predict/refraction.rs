const STANDARD_PRESSURE_MBAR: f64 = 1010.0;
const STANDARD_TEMPERATURE_C: f64 = 10.0;

/// Atmospheric refraction for a body at infinite range, given its true
/// (unrefracted) elevation. Radians in, radians out.
///
/// Sæmundsson's formula at a standard atmosphere. Returns 0.0 outside the
/// range [-1°, 89.9°].
pub fn refraction(elevation_rad: f64) -> f64 {
    let alt_deg = elevation_rad.to_degrees();
    if !(-1.0..=89.9).contains(&alt_deg) {
        return 0.0;
    }
    let arcmin = 1.02 / (alt_deg + 10.3 / (alt_deg + 5.11)).to_radians().tan();
    let scaled = arcmin * (STANDARD_PRESSURE_MBAR / 1010.0)
        * (283.0 / (273.0 + STANDARD_TEMPERATURE_C));
    (scaled / 60.0).to_radians()
}
