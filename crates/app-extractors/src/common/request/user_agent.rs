use rand::{seq::SliceRandom, Rng};

/// The operating system a generated user agent pretends to run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsClass {
    Ios,
    Android,
    Windows,
}

const ANDROID_DEVICES: &[&str] = &[
    "SM-G9910",
    "SM-S9080",
    "Pixel 7",
    "Pixel 8 Pro",
    "M2102J2SC",
    "22081212C",
    "V2227A",
    "PGT-AN10",
    "NOH-AN00",
];

/// Generate a plausible browser user agent for the given OS class.
///
/// A fresh value is produced on every call.
#[must_use]
pub fn random_user_agent(os: OsClass) -> String {
    let mut rng = rand::thread_rng();

    match os {
        OsClass::Ios => {
            let major = rng.gen_range(15..=17);
            let minor = rng.gen_range(0..=6);
            format!(
                "Mozilla/5.0 (iPhone; CPU iPhone OS {major}_{minor} like Mac OS X) \
                 AppleWebKit/605.1.15 (KHTML, like Gecko) Version/{major}.{minor} \
                 Mobile/15E148 Safari/604.1"
            )
        }
        OsClass::Android => {
            let android = rng.gen_range(10..=14);
            let device = ANDROID_DEVICES.choose(&mut rng).copied().unwrap_or("Pixel 7");
            let (chrome, build, patch) = chrome_version(&mut rng);
            format!(
                "Mozilla/5.0 (Linux; Android {android}; {device}) AppleWebKit/537.36 (KHTML, \
                 like Gecko) Chrome/{chrome}.0.{build}.{patch} Mobile Safari/537.36"
            )
        }
        OsClass::Windows => {
            let (chrome, build, patch) = chrome_version(&mut rng);
            let base = format!(
                "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like \
                 Gecko) Chrome/{chrome}.0.{build}.{patch} Safari/537.36"
            );

            if rng.gen_bool(0.3) {
                format!("{base} Edg/{chrome}.0.{build}.{}", rng.gen_range(40..=99))
            } else {
                base
            }
        }
    }
}

fn chrome_version<R: Rng>(rng: &mut R) -> (u32, u32, u32) {
    let chrome = rng.gen_range(110..=126);
    let build = 5400 + (chrome - 110) * 60 + rng.gen_range(0..=40);
    let patch = rng.gen_range(50..=220);

    (chrome, build, patch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ios_agent_looks_like_mobile_safari() {
        let ua = random_user_agent(OsClass::Ios);

        assert!(ua.contains("iPhone OS"));
        assert!(ua.contains("Mobile/15E148"));
    }

    #[test]
    fn android_agent_names_a_device() {
        let ua = random_user_agent(OsClass::Android);

        assert!(ua.contains("Android"));
        assert!(ANDROID_DEVICES.iter().any(|d| ua.contains(d)));
    }

    #[test]
    fn windows_agent_is_desktop_chrome() {
        for _ in 0..20 {
            let ua = random_user_agent(OsClass::Windows);

            assert!(ua.starts_with("Mozilla/5.0 (Windows NT 10.0; Win64; x64)"));
            assert!(ua.contains("Chrome/"));
            assert!(!ua.contains("Mobile"));
        }
    }
}
