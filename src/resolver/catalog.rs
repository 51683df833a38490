//! The fixed catalog of optional runtime features.

use crate::core::feature::{FeatureGroup, FeatureMatrix, Requirement};
use crate::core::platform::PlatformId;

/// Resolve the extras available on `platform`.
///
/// Pure and total: every platform, including [`PlatformId::Other`], gets the
/// same set of keys. Only the requirement lists differ.
pub fn resolve(platform: PlatformId) -> FeatureMatrix {
    [
        encryption(),
        ocsp(platform),
        FeatureGroup::new("snappy", vec![Requirement::any("python-snappy")]),
        FeatureGroup::new("zstd", vec![Requirement::any("zstandard")]),
        FeatureGroup::new(
            "aws",
            vec![Requirement::any("pymongo-auth-aws").below(2, 0, 0)],
        ),
        FeatureGroup::new(
            "srv",
            vec![Requirement::any("dnspython").at_least(1, 16, 0).below(3, 0, 0)],
        ),
        gssapi(platform),
    ]
    .into_iter()
    .collect()
}

fn encryption() -> FeatureGroup {
    FeatureGroup::new(
        "encryption",
        vec![Requirement::any("pymongocrypt").at_least(1, 2, 0).below(2, 0, 0)],
    )
}

fn ocsp(platform: PlatformId) -> FeatureGroup {
    let mut requirements = vec![
        Requirement::any("pyopenssl").at_least(17, 2, 0),
        Requirement::any("requests").below(3, 0, 0),
        Requirement::any("service_identity").at_least(18, 1, 0),
    ];
    // CA bundle fallback for when OpenSSL cannot load the system store
    if matches!(platform, PlatformId::Windows | PlatformId::Darwin) {
        requirements.push(Requirement::any("certifi"));
    }
    FeatureGroup::new("ocsp", requirements)
}

fn gssapi(platform: PlatformId) -> FeatureGroup {
    let kerberos = match platform {
        PlatformId::Windows => Requirement::any("winkerberos").at_least(0, 5, 0),
        _ => Requirement::any("pykerberos"),
    };
    FeatureGroup::new("gssapi", vec![kerberos])
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [PlatformId; 4] = [
        PlatformId::Linux,
        PlatformId::Windows,
        PlatformId::Darwin,
        PlatformId::Other,
    ];

    fn names(matrix: &FeatureMatrix, key: &str) -> Vec<String> {
        matrix
            .get(key)
            .unwrap()
            .iter()
            .map(|r| r.name().to_string())
            .collect()
    }

    #[test]
    fn test_resolve_is_idempotent() {
        for platform in ALL {
            assert_eq!(resolve(platform), resolve(platform));
        }
    }

    #[test]
    fn test_same_keys_everywhere() {
        let expected = vec!["aws", "encryption", "gssapi", "ocsp", "snappy", "srv", "zstd"];
        for platform in ALL {
            assert_eq!(resolve(platform).keys().collect::<Vec<_>>(), expected);
        }
    }

    #[test]
    fn test_certifi_only_on_windows_and_darwin() {
        for platform in [PlatformId::Windows, PlatformId::Darwin] {
            let matrix = resolve(platform);
            assert!(names(&matrix, "ocsp").contains(&"certifi".to_string()));
        }
        for platform in [PlatformId::Linux, PlatformId::Other] {
            let matrix = resolve(platform);
            assert!(!names(&matrix, "ocsp").contains(&"certifi".to_string()));
            assert_eq!(names(&matrix, "ocsp").len(), 3);
        }
    }

    #[test]
    fn test_kerberos_binding_by_platform() {
        let windows = resolve(PlatformId::Windows);
        assert_eq!(
            windows.get("gssapi").unwrap()[0].to_string(),
            "winkerberos>=0.5.0"
        );

        for platform in [PlatformId::Linux, PlatformId::Darwin, PlatformId::Other] {
            assert_eq!(names(&resolve(platform), "gssapi"), vec!["pykerberos"]);
        }
    }

    #[test]
    fn test_posix_layer_on_windows_gets_posix_extras() {
        for name in ["cygwin", "msys"] {
            let matrix = resolve(PlatformId::parse(name));
            assert_eq!(names(&matrix, "gssapi"), vec!["pykerberos"]);
            assert!(!names(&matrix, "ocsp").contains(&"certifi".to_string()));
        }
    }

    #[test]
    fn test_constraints_render() {
        let matrix = resolve(PlatformId::Linux);
        let rendered = |key: &str| -> Vec<String> {
            matrix.get(key).unwrap().iter().map(|r| r.to_string()).collect()
        };

        assert_eq!(rendered("encryption"), vec!["pymongocrypt>=1.2.0,<2.0.0"]);
        assert_eq!(rendered("aws"), vec!["pymongo-auth-aws<2.0.0"]);
        assert_eq!(rendered("srv"), vec!["dnspython>=1.16.0,<3.0.0"]);
        assert_eq!(
            rendered("ocsp"),
            vec!["pyopenssl>=17.2.0", "requests<3.0.0", "service_identity>=18.1.0"]
        );
    }
}
