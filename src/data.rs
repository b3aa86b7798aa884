use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Electron subshell designators in ENDF order.
///
/// The subshell at index `i` owns the ionisation (photoelectric) reaction
/// code `534 + i`.
pub const SUBSHELLS: &[&str] = &[
    "K", "L1", "L2", "L3", "M1", "M2", "M3", "M4", "M5", "N1", "N2", "N3", "N4", "N5", "N6", "N7",
    "O1", "O2", "O3", "O4", "O5", "O6", "O7", "O8", "O9", "P1", "P2", "P3", "P4", "P5", "P6", "P7",
    "P8", "P9", "P10", "P11", "Q1", "Q2", "Q3",
];

/// Reaction code of the K subshell ionisation reaction.
pub const FIRST_SUBSHELL_CODE: i32 = 534;

// Named codes; "z" stands for any incident particle
const NAMED_CODES: &[(i32, &str)] = &[
    (1, "(z,total)"),
    (2, "(z,elastic)"),
    (3, "(z,nonelastic)"),
    (4, "(z,inelastic)"),
    (5, "(z,anything)"),
    (10, "(z,continuum)"),
    (11, "(z,2nd)"),
    (16, "(z,2n)"),
    (17, "(z,3n)"),
    (18, "(z,fission)"),
    (19, "(z,f)"),
    (20, "(z,nf)"),
    (21, "(z,2nf)"),
    (22, "(z,na)"),
    (23, "(z,n3a)"),
    (24, "(z,2na)"),
    (25, "(z,3na)"),
    (27, "(z,absorption)"),
    (28, "(z,np)"),
    (29, "(z,n2a)"),
    (30, "(z,2n2a)"),
    (32, "(z,nd)"),
    (33, "(z,nt)"),
    (34, "(z,n3He)"),
    (35, "(z,nd2a)"),
    (36, "(z,nt2a)"),
    (37, "(z,4n)"),
    (38, "(z,3nf)"),
    (41, "(z,2np)"),
    (42, "(z,3np)"),
    (44, "(z,n2p)"),
    (45, "(z,npa)"),
    (91, "(z,nc)"),
    (101, "(z,disappearance)"),
    (102, "(z,gamma)"),
    (103, "(z,p)"),
    (104, "(z,d)"),
    (105, "(z,t)"),
    (106, "(z,3He)"),
    (107, "(z,a)"),
    (108, "(z,2a)"),
    (109, "(z,3a)"),
    (111, "(z,2p)"),
    (112, "(z,pa)"),
    (113, "(z,t2a)"),
    (114, "(z,d2a)"),
    (115, "(z,pd)"),
    (116, "(z,pt)"),
    (117, "(z,da)"),
    (152, "(z,5n)"),
    (153, "(z,6n)"),
    (154, "(z,2nt)"),
    (155, "(z,ta)"),
    (156, "(z,4np)"),
    (157, "(z,3nd)"),
    (158, "(z,nda)"),
    (159, "(z,2npa)"),
    (160, "(z,7n)"),
    (161, "(z,8n)"),
    (162, "(z,5np)"),
    (163, "(z,6np)"),
    (164, "(z,7np)"),
    (165, "(z,4na)"),
    (166, "(z,5na)"),
    (167, "(z,6na)"),
    (168, "(z,7na)"),
    (169, "(z,4nd)"),
    (170, "(z,5nd)"),
    (171, "(z,6nd)"),
    (172, "(z,3nt)"),
    (173, "(z,4nt)"),
    (174, "(z,5nt)"),
    (175, "(z,6nt)"),
    (176, "(z,2n3He)"),
    (177, "(z,3n3He)"),
    (178, "(z,4n3He)"),
    (179, "(z,3n2p)"),
    (180, "(z,3n2a)"),
    (181, "(z,3npa)"),
    (182, "(z,dt)"),
    (183, "(z,npd)"),
    (184, "(z,npt)"),
    (185, "(z,ndt)"),
    (186, "(z,np3He)"),
    (187, "(z,nd3He)"),
    (188, "(z,nt3He)"),
    (189, "(z,nta)"),
    (190, "(z,2n2p)"),
    (191, "(z,p3He)"),
    (192, "(z,d3He)"),
    (193, "(z,3Hea)"),
    (194, "(z,4n2p)"),
    (195, "(z,4n2a)"),
    (196, "(z,4npa)"),
    (197, "(z,3p)"),
    (198, "(z,n3p)"),
    (199, "(z,3n2pa)"),
    (200, "(z,5n2p)"),
    (251, "mubar"),
    (252, "xi"),
    (253, "gamma"),
    (452, "nubar-total"),
    (454, "fission-yields-independent"),
    (455, "nubar-delayed"),
    (456, "nubar-prompt"),
    (458, "fission-energy-release"),
    (459, "fission-yields-cumulative"),
    (501, "total"),
    (502, "coherent"),
    (504, "incoherent"),
    (515, "pair-production-electron"),
    (516, "pair-production"),
    (517, "pair-production-nuclear"),
    (522, "ionisation"),
    (525, "large-angle-elastic"),
    (526, "elastic"),
    (527, "bremsstrahlung"),
    (528, "excitation"),
];

// Discrete-level series: first code, number of levels, outgoing particle label
const LEVEL_SERIES: &[(i32, i32, &str)] = &[
    (50, 41, "n"),
    (600, 49, "p"),
    (650, 49, "d"),
    (700, 49, "t"),
    (750, 49, "3He"),
    (800, 49, "a"),
    (875, 16, "2n"),
];

/// A static HashMap that maps reaction codes to their conventional names.
///
/// Built from the named codes above plus the discrete-level series
/// (`(z,n0)`..`(z,n40)`, `(z,p0)`..`(z,pc)`, ...) and the subshell
/// ionisation codes (`ionisation-K`, `ionisation-L1`, ...).
pub static REACTION_NAME: Lazy<HashMap<i32, String>> = Lazy::new(|| {
    let mut names: HashMap<i32, String> = NAMED_CODES
        .iter()
        .map(|&(code, name)| (code, name.to_string()))
        .collect();
    for &(first, levels, particle) in LEVEL_SERIES {
        for level in 0..levels {
            names.insert(first + level, format!("(z,{}{})", particle, level));
        }
        // the continuum follows the last level, except for MT 91 which is named above
        if first != 50 {
            names.insert(first + levels, format!("(z,{}c)", particle));
        }
    }
    for (i, subshell) in SUBSHELLS.iter().enumerate() {
        names.insert(FIRST_SUBSHELL_CODE + i as i32, format!("ionisation-{}", subshell));
    }
    names
});

/// Reverse lookup of [`REACTION_NAME`]. Includes `fission` as an alias for 18.
pub static REACTION_CODE: Lazy<HashMap<String, i32>> = Lazy::new(|| {
    let mut codes: HashMap<String, i32> = REACTION_NAME
        .iter()
        .map(|(&code, name)| (name.clone(), code))
        .collect();
    codes.insert("fission".to_string(), 18);
    codes
});

/// Conventional name of a reaction code, if it has one.
pub fn reaction_name(code: i32) -> Option<&'static str> {
    REACTION_NAME.get(&code).map(String::as_str)
}

/// Reaction code for a conventional name, if it has one.
pub fn reaction_code(name: &str) -> Option<i32> {
    REACTION_CODE.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_codes() {
        assert_eq!(reaction_name(2), Some("(z,elastic)"));
        assert_eq!(reaction_name(102), Some("(z,gamma)"));
        assert_eq!(reaction_name(526), Some("elastic"));
        assert_eq!(reaction_name(9999), None);
    }

    #[test]
    fn test_level_series() {
        assert_eq!(reaction_name(50), Some("(z,n0)"));
        assert_eq!(reaction_name(90), Some("(z,n40)"));
        assert_eq!(reaction_name(91), Some("(z,nc)"));
        assert_eq!(reaction_name(600), Some("(z,p0)"));
        assert_eq!(reaction_name(649), Some("(z,pc)"));
        assert_eq!(reaction_name(849), Some("(z,ac)"));
        assert_eq!(reaction_name(875), Some("(z,2n0)"));
        assert_eq!(reaction_name(891), Some("(z,2nc)"));
    }

    #[test]
    fn test_subshell_codes() {
        assert_eq!(SUBSHELLS.len(), 39);
        assert_eq!(reaction_name(534), Some("ionisation-K"));
        assert_eq!(reaction_name(572), Some("ionisation-Q3"));
    }

    #[test]
    fn test_reverse_lookup() {
        assert_eq!(reaction_code("(z,2n)"), Some(16));
        assert_eq!(reaction_code("fission"), Some(18));
        assert_eq!(reaction_code("(z,p3)"), Some(603));
        assert_eq!(reaction_code("nonsense"), None);
    }
}
