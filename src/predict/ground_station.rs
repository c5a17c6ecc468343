// WGS-84 constants
const WGS84_A_KM: f64 = 6378.137;
const WGS84_E2: f64 = 0.00669437999014;

/// Observer location. Latitude and longitude in degrees, altitude in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundStation {
    pub latitude_deg: f64,
    pub longitude_deg: f64,
    pub altitude_m: f64,
}

impl GroundStation {
    pub fn new(latitude_deg: f64, longitude_deg: f64, altitude_m: f64) -> Self {
        Self {
            latitude_deg,
            longitude_deg,
            altitude_m,
        }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude_deg.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude_deg.to_radians()
    }

    pub fn position_ecef_km(&self) -> [f64; 3] {
        let lat = self.lat_rad();
        let lon = self.lon_rad();
        let sin_lat = lat.sin();
        let cos_lat = lat.cos();
        let sin_lon = lon.sin();
        let cos_lon = lon.cos();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        let alt_km = self.altitude_m / 1000.0;
        let x = (n + alt_km) * cos_lat * cos_lon;
        let y = (n + alt_km) * cos_lat * sin_lon;
        let z = (n * (1.0 - WGS84_E2) + alt_km) * sin_lat;
        [x, y, z]
    }

    /// Station position in the inertial (TEME) frame at the given sidereal angle.
    pub fn position_teme_km(&self, gmst: f64) -> [f64; 3] {
        let ecef = self.position_ecef_km();
        let cos_gmst = gmst.cos();
        let sin_gmst = gmst.sin();
        [
            ecef[0] * cos_gmst - ecef[1] * sin_gmst,
            ecef[0] * sin_gmst + ecef[1] * cos_gmst,
            ecef[2],
        ]
    }
}

/// Height above the WGS-84 ellipsoid of an ECEF position, both in km.
pub fn geodetic_altitude_km(ecef: [f64; 3]) -> f64 {
    let p = (ecef[0] * ecef[0] + ecef[1] * ecef[1]).sqrt();
    if p < 1e-9 {
        return ecef[2].abs() - WGS84_A_KM * (1.0 - WGS84_E2).sqrt();
    }

    let mut lat = (ecef[2] / (p * (1.0 - WGS84_E2))).atan();
    let mut height = 0.0;
    for _ in 0..10 {
        let sin_lat = lat.sin();
        let n = WGS84_A_KM / (1.0 - WGS84_E2 * sin_lat * sin_lat).sqrt();
        height = p / lat.cos() - n;
        let next = (ecef[2] / (p * (1.0 - WGS84_E2 * n / (n + height)))).atan();
        if (next - lat).abs() < 1e-12 {
            lat = next;
            break;
        }
        lat = next;
    }
    height
}
