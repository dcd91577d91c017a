//! Embedded rotor set tables for all supported machine families.
//!
//! The tables carry the wiring permutations and notch ring data of the
//! Enigma family (including both Typex wheel sets), the SIGABA, the KL7,
//! the Nema and the SG39. Each family is exposed as a ready made
//! [`RotorSet`].

use crate::permutation::Permutation;
use crate::rotorset::{RotorEntry, RotorSet};
use crate::utils::STD_ALPHA;

// ---------------------------------------------------------------------------
// Enigma family rotor ids
// ---------------------------------------------------------------------------

pub const WALZE_I: u32 = 0;
pub const WALZE_II: u32 = 1;
pub const WALZE_III: u32 = 2;
pub const WALZE_IV: u32 = 3;
pub const WALZE_V: u32 = 4;
pub const WALZE_VI: u32 = 5;
pub const WALZE_VII: u32 = 6;
pub const WALZE_VIII: u32 = 7;

pub const WALZE_ABW_I: u32 = 8;
pub const WALZE_ABW_II: u32 = 9;
pub const WALZE_ABW_III: u32 = 10;
pub const WALZE_ABW_ETW: u32 = 11;

pub const WALZE_RB_I: u32 = 12;
pub const WALZE_RB_II: u32 = 13;
pub const WALZE_RB_III: u32 = 14;
pub const WALZE_RB_ETW: u32 = 15;

pub const WALZE_T_I: u32 = 16;
pub const WALZE_T_II: u32 = 17;
pub const WALZE_T_III: u32 = 18;
pub const WALZE_T_IV: u32 = 19;
pub const WALZE_T_V: u32 = 20;
pub const WALZE_T_VI: u32 = 21;
pub const WALZE_T_VII: u32 = 22;
pub const WALZE_T_VIII: u32 = 23;
pub const WALZE_T_ETW: u32 = 24;

pub const TYPEX_SP_02390_A: u32 = 25;
pub const TYPEX_SP_02390_B: u32 = 26;
pub const TYPEX_SP_02390_C: u32 = 27;
pub const TYPEX_SP_02390_D: u32 = 28;
pub const TYPEX_SP_02390_E: u32 = 29;
pub const TYPEX_SP_02390_F: u32 = 30;
pub const TYPEX_SP_02390_G: u32 = 31;
pub const TYPEX_ETW: u32 = 32;

pub const WALZE_KD_I: u32 = 33;
pub const WALZE_KD_II: u32 = 34;
pub const WALZE_KD_III: u32 = 35;
pub const WALZE_KD_IV: u32 = 36;
pub const WALZE_KD_V: u32 = 37;
pub const WALZE_KD_VI: u32 = 38;
pub const WALZE_KD_ETW: u32 = 39;

pub const TYPEX_Y_269_A: u32 = 40;
pub const TYPEX_Y_269_B: u32 = 41;
pub const TYPEX_Y_269_C: u32 = 42;
pub const TYPEX_Y_269_D: u32 = 43;
pub const TYPEX_Y_269_E: u32 = 44;
pub const TYPEX_Y_269_F: u32 = 45;
pub const TYPEX_Y_269_G: u32 = 46;
pub const TYPEX_Y_269_H: u32 = 47;
pub const TYPEX_Y_269_I: u32 = 48;
pub const TYPEX_Y_269_J: u32 = 49;
pub const TYPEX_Y_269_K: u32 = 50;
pub const TYPEX_Y_269_L: u32 = 51;
pub const TYPEX_Y_269_M: u32 = 52;
pub const TYPEX_Y_269_N: u32 = 53;

pub const UKW_A: u32 = 100;
pub const UKW_B: u32 = 101;
pub const UKW_C: u32 = 102;
pub const UKW_B_DN: u32 = 103;
pub const UKW_C_DN: u32 = 104;
pub const WALZE_BETA: u32 = 105;
pub const WALZE_GAMMA: u32 = 106;
pub const UKW_ABW: u32 = 107;
pub const UKW_RB: u32 = 108;
pub const UKW_T: u32 = 109;
pub const TYPEX_SP_02390_UKW: u32 = 110;
pub const UKW_D: u32 = 111;
pub const TYPEX_Y_269_UKW: u32 = 112;

// ---------------------------------------------------------------------------
// Enigma family wirings and notch rings
// ---------------------------------------------------------------------------

const PERM_I: &str = "ekmflgdqvzntowyhxuspaibrcj";
const PERM_II: &str = "ajdksiruxblhwtmcqgznpyfvoe";
const PERM_III: &str = "bdfhjlcprtxvznyeiwgakmusqo";
const PERM_IV: &str = "esovpzjayquirhxlnftgkdcmwb";
const PERM_V: &str = "vzbrgityupsdnhlxawmjqofeck";
const PERM_VI: &str = "jpgvoumfyqbenhzrdkasxlictw";
const PERM_VII: &str = "nzjhgrcxmyswboufaivlpekqdt";
const PERM_VIII: &str = "fkqhtlxocbjspdzramewniuygv";

const NOTCH_I: &str = "q";
const NOTCH_II: &str = "e";
const NOTCH_III: &str = "v";
const NOTCH_IV: &str = "j";
const NOTCH_V: &str = "z";
const NOTCH_VI: &str = "zm";
const NOTCH_VII: &str = "zm";
const NOTCH_VIII: &str = "zm";

const PERM_BETA: &str = "leyjvcnixwpbqmdrtakzgfuhos";
const PERM_GAMMA: &str = "fsokanuerhmbtiycwlqpzxvgjd";

const PERM_UKW_A: &str = "ejmzalyxvbwfcrquontspikhgd";
const PERM_UKW_B: &str = "yruhqsldpxngokmiebfzcwvjat";
const PERM_UKW_C: &str = "fvpjiaoyedrzxwgctkuqsbnmhl";
const PERM_UKW_D: &str = "fowulaqysrtezvbxgjikdncphm";
const PERM_UKW_B_DN: &str = "enkqauywjicopblmdxzvfthrgs";
const PERM_UKW_C_DN: &str = "rdobjntkvehmlfcwzaxgyipsuq";

const PERM_ABW_I: &str = "dmtwsilruyqnkfejcazbpgxohv";
const PERM_ABW_II: &str = "hqzgpjtmoblncifdyawveusrkx";
const PERM_ABW_III: &str = "uqntlszfmrehdpxkibvygjcwoa";
const PERM_ABW_UKW: &str = "rulqmzjsygocetkwdahnbxpvif";
const PERM_ABW_ETW: &str = "qwertzuioasdfghjkpyxcvbnml";

const NOTCH_ABW_I: &str = "suvwzabcefgiklopq";
const NOTCH_ABW_II: &str = "stvyzacdfghkmnq";
const NOTCH_ABW_III: &str = "uwxaefhkmnr";

const PERM_RB_I: &str = "jgdqoxuscamifrvtpnewkblzyh";
const PERM_RB_II: &str = "ntzpsfbokmwrcjdivlaeyuxhgq";
const PERM_RB_III: &str = "jviubhtcdyakeqzposgxnrmwfl";
const PERM_RB_UKW: &str = "qyhognecvpuztfdjaxwmkisrbl";
const PERM_RB_ETW: &str = "qwertzuioasdfghjkpyxcvbnml";

const NOTCH_RB_I: &str = "n";
const NOTCH_RB_II: &str = "e";
const NOTCH_RB_III: &str = "y";

const PERM_T_I: &str = "kptyuelocvgrfqdanjmbswhzxi";
const PERM_T_II: &str = "uphzlweqmtdjxcaksoigvbyfnr";
const PERM_T_III: &str = "qudlyrfekonvzaxwhmgpjbsict";
const PERM_T_IV: &str = "ciwtbkxnrespflydagvhquojzm";
const PERM_T_V: &str = "uaxgisnjbverdylfzwtpckohmq";
const PERM_T_VI: &str = "xfuzgalvhcnysewqtdmrbkpioj";
const PERM_T_VII: &str = "bjvftxplnayozikwgdqeruchsm";
const PERM_T_VIII: &str = "ymtpnzhwkodajxeluqvgcbisfr";
const PERM_T_ETW: &str = "kzrouqhyaigblwvstdxfpnmcje";
const PERM_T_UKW: &str = "gekpbtaumocniljdxzyfhwvqsr";

const NOTCH_T_I: &str = "wzekq";
const NOTCH_T_II: &str = "wzflr";
const NOTCH_T_III: &str = "wzekq";
const NOTCH_T_IV: &str = "wzflr";
const NOTCH_T_V: &str = "ycfkr";
const NOTCH_T_VI: &str = "xeimq";
const NOTCH_T_VII: &str = "ycfkr";
const NOTCH_T_VIII: &str = "xeimq";

const NOTCH_EMPTY: &str = "";

const PERM_SP_02390_A: &str = "rfnvbktihxqgcwaeolsmpydzuj";
const PERM_SP_02390_B: &str = "oltgenzujdibypsafwrqmcxkhv";
const PERM_SP_02390_C: &str = "twbhqdurmlnieaksvoycjgxfpz";
const PERM_SP_02390_D: &str = "lyumxsfbpzonkjceqiatgwrhdv";
const PERM_SP_02390_E: &str = "kgbtysoaivxcjprqznhlfwuemd";
const PERM_SP_02390_F: &str = "gmruybjzhfktdwqcosxaiepnvl";
const PERM_SP_02390_G: &str = "lusyeitrjapfkwcvmqhbgnxzod";
const PERM_SP_02390_UKW: &str = "yruhqsldpxngokmiebfzcwvjat";
const PERM_TYPEX_ETW: &str = "qwertzuioasdfghjkpyxcvbnml";

const PERM_Y_269_A: &str = "uwirlzpebjodkvafmtcshyxgnq";
const PERM_Y_269_B: &str = "ygbaowmtjrhpenfcxkuidqzlsv";
const PERM_Y_269_C: &str = "hwautkyjonlfiqzdcbrgpemxvs";
const PERM_Y_269_D: &str = "qybuhaojnctlizswfpmgevxdrk";
const PERM_Y_269_E: &str = "yiloktbwfqncghpxdjsvaumzre";
const PERM_Y_269_F: &str = "exaybhvusolcmqgwndiztpkfjr";
const PERM_Y_269_G: &str = "kboizmtxrhdcgpyausvlqjewnf";
const PERM_Y_269_H: &str = "hqxcnbirumoyaftgkzleswjdvp";
const PERM_Y_269_I: &str = "bumpzvykjxgtdrocslqiaehwfn";
const PERM_Y_269_J: &str = "kchgdvueobmlxrfwynqizpjats";
const PERM_Y_269_K: &str = "wjaveciqnkzgdubspxmfythlro";
const PERM_Y_269_L: &str = "igesoyldujamvhrcxfpztqnbwk";
const PERM_Y_269_M: &str = "hdrzvlbtioewcknsyfqxmupgja";
const PERM_Y_269_N: &str = "lcmsbeioqjxfawkthdrznvypgu";
const PERM_Y_269_UKW: &str = "yruhqsldpxngokmiebfzcwvjat";

const NOTCH_TYPEX: &str = "fmsz";

const PERM_KD_I: &str = "veziojcxkyduntwaplqgbhsfmr";
const PERM_KD_II: &str = "hgrbsjzetdlvpmqycxaokinfuw";
const PERM_KD_III: &str = "nwlhxgrbyojsazdvtpkfqmeuic";
const PERM_KD_IV: &str = "dauiybtovemsgxlwjpnckfzrqh";
const PERM_KD_V: &str = "dclkmsaehuiqryvbwfpzjngtox";
const PERM_KD_VI: &str = "wayqcrtvkeuxszlgbjofndpmih";
const PERM_KD_ETW: &str = "qwertzuioasdfghjkpyxcvbnml";

const NOTCH_KD: &str = "suyaehlnq";

// ---------------------------------------------------------------------------
// SIGABA
// ---------------------------------------------------------------------------

pub const SIGABA_ROTOR_0: u32 = 0;
pub const SIGABA_INDEX_0: u32 = 100;

/// The ten interchangeable large rotors used in both the cipher and the
/// control bank of the SIGABA, in the published wiring order.
const SIGABA_WIRINGS: [&str; 10] = [
    "ychlqsugbdixnzkerpvjtawfom",
    "inpxbwetguysaochvldmqkzjfr",
    "wndriozptaxhfjyqbmsvekucgl",
    "tzghobkrvuxlqdmpnfwcjyeias",
    "ywtahrqjvlcexungbipzmsdfok",
    "qslrbtekogaicfwyvmhjnxzudp",
    "chjdqignbsakvtuoxfwleprmzy",
    "cdfajxtimnbeqhsugrylwzkvpo",
    "xhfeszdnrbcgkqijltvmuoyapw",
    "ezjqxmogytcsfriupvnadlhwbk",
];

/// The five ten-contact index rotors.
const SIGABA_INDEX_WIRINGS: [&str; 5] = [
    "7591482630",
    "3810592764",
    "4086153297",
    "3980526174",
    "6497135280",
];

/// Alphabet of the index rotors.
pub const SIGABA_INDEX_ALPHA: &str = "0123456789";

// ---------------------------------------------------------------------------
// KL7
// ---------------------------------------------------------------------------

pub const KL7_ROTOR_A: u32 = 0;
pub const KL7_RING_1: u32 = 100;
pub const KL7_RING_WIDE: u32 = 111;

/// Contact count of the KL7 rotors.
pub const KL7_ROTOR_SIZE: usize = 36;

/// Window lettering of the 36-position KL7 rotors.
pub const KL7_ALPHA: &str = "abcdefghijklmnopqrstuvwxyz0123456789";

/// The thirteen KL7 rotors A-M; contact numbering is 1-based in the source
/// documents and converted on load.
const KL7_ROTORS: [[u8; 36]; 13] = [
    [
        29, 27, 14, 8, 35, 4, 28, 11, 5, 13, 20, 3, 25, 33, 18, 15, 7, 12, 34, 16, 17, 1, 9, 30,
        24, 23, 2, 32, 10, 19, 6, 26, 36, 22, 31, 21,
    ],
    [
        23, 19, 26, 16, 2, 13, 14, 35, 21, 4, 17, 31, 25, 3, 18, 27, 12, 34, 36, 10, 30, 6, 7, 15,
        28, 1, 11, 33, 29, 20, 32, 24, 5, 22, 8, 9,
    ],
    [
        19, 26, 28, 36, 6, 25, 31, 18, 27, 10, 5, 1, 32, 9, 11, 33, 23, 17, 29, 12, 13, 2, 16, 15,
        35, 8, 24, 22, 30, 3, 34, 14, 7, 20, 21, 4,
    ],
    [
        15, 26, 36, 13, 1, 31, 25, 33, 3, 32, 21, 23, 17, 29, 7, 22, 20, 24, 12, 10, 14, 30, 19,
        28, 4, 35, 5, 8, 6, 9, 16, 27, 2, 11, 34, 18,
    ],
    [
        13, 4, 2, 16, 17, 30, 21, 5, 33, 7, 29, 8, 9, 36, 35, 23, 34, 25, 20, 22, 28, 15, 1, 19,
        24, 27, 10, 11, 6, 12, 32, 26, 14, 3, 18, 31,
    ],
    [
        26, 34, 27, 14, 2, 1, 31, 36, 11, 9, 35, 18, 15, 12, 4, 7, 29, 8, 23, 19, 3, 30, 20, 17,
        28, 21, 22, 5, 25, 33, 16, 13, 24, 6, 10, 32,
    ],
    [
        20, 19, 9, 32, 36, 2, 6, 33, 12, 28, 4, 10, 3, 24, 29, 16, 22, 18, 30, 17, 7, 34, 15, 23,
        31, 25, 27, 1, 21, 26, 8, 5, 13, 35, 11, 14,
    ],
    [
        28, 19, 23, 5, 17, 36, 27, 14, 16, 20, 21, 7, 12, 22, 11, 35, 13, 15, 1, 32, 8, 18, 33, 4,
        9, 29, 26, 24, 25, 34, 10, 6, 3, 30, 2, 31,
    ],
    [
        25, 6, 35, 12, 21, 22, 19, 32, 20, 23, 30, 18, 1, 16, 31, 11, 24, 13, 33, 7, 36, 9, 34, 2,
        10, 8, 26, 29, 15, 17, 4, 28, 14, 3, 27, 5,
    ],
    [
        8, 31, 1, 28, 20, 6, 32, 5, 33, 21, 30, 12, 4, 14, 15, 34, 7, 35, 16, 18, 29, 22, 25, 26,
        36, 11, 23, 19, 3, 2, 13, 27, 24, 10, 17, 9,
    ],
    [
        15, 13, 36, 23, 6, 21, 32, 18, 31, 20, 1, 24, 10, 35, 19, 28, 7, 8, 26, 12, 29, 22, 25,
        30, 5, 9, 2, 27, 16, 4, 17, 3, 34, 14, 11, 33,
    ],
    [
        8, 18, 15, 33, 7, 26, 20, 16, 34, 23, 36, 27, 12, 24, 19, 13, 2, 3, 14, 29, 1, 6, 32, 10,
        25, 30, 9, 5, 28, 17, 22, 31, 4, 11, 21, 35,
    ],
    [
        36, 6, 29, 28, 24, 26, 21, 22, 20, 35, 15, 19, 23, 30, 1, 8, 12, 7, 13, 27, 31, 32, 9, 33,
        10, 16, 14, 18, 34, 2, 3, 17, 25, 11, 4, 5,
    ],
];

/// Notch ring data of the eleven KL7 rings, one 11-bit column per rotor
/// position as published; ring r is column r of this table.
const KL7_RING_COLS: [&str; 36] = [
    "10111010101",
    "00100010111",
    "01011001100",
    "01000001000",
    "10000011101",
    "01001100000",
    "00111100100",
    "01100111110",
    "00000010000",
    "10110000011",
    "00001100011",
    "01000111000",
    "00000010100",
    "11011001010",
    "11110000011",
    "00000101110",
    "10000001101",
    "00011110011",
    "11101000000",
    "00010001100",
    "00000001000",
    "01001111111",
    "11000100000",
    "10101010000",
    "00010101101",
    "01111100011",
    "10010001000",
    "11101110100",
    "00001110110",
    "00110000010",
    "10010010101",
    "11110111100",
    "00000001111",
    "00011010010",
    "01101001010",
    "11000101000",
];

// ---------------------------------------------------------------------------
// Nema
// ---------------------------------------------------------------------------

pub const NEMA_ROTOR_A: u32 = 0;
pub const NEMA_UKW: u32 = 6;
pub const NEMA_ETW: u32 = 7;
pub const NEMA_DRIVE_WHEEL_1: u32 = 100;
pub const NEMA_DRIVE_WHEEL_2: u32 = 101;
pub const NEMA_DRIVE_WHEEL_12: u32 = 102;

/// The Nema wheel wirings as published, with 1-based contact numbers that
/// are relabelled through the `i`-based contact alphabet on load.
const NEMA_PERMS: [[u8; 26]; 7] = [
    [
        5, 14, 15, 19, 13, 2, 22, 10, 4, 18, 16, 26, 24, 9, 23, 25, 8, 20, 6, 11, 3, 1, 12, 21, 7,
        17,
    ],
    [
        4, 7, 18, 9, 20, 15, 8, 11, 16, 1, 10, 24, 19, 25, 13, 22, 14, 21, 3, 2, 17, 6, 12, 5, 23,
        26,
    ],
    [
        18, 17, 19, 26, 14, 10, 15, 7, 2, 11, 25, 20, 9, 5, 3, 21, 16, 4, 8, 6, 24, 13, 12, 23,
        22, 1,
    ],
    [
        5, 22, 12, 19, 18, 3, 16, 8, 1, 9, 26, 11, 14, 4, 25, 7, 6, 10, 15, 2, 20, 23, 17, 24, 13,
        21,
    ],
    [
        6, 19, 21, 24, 13, 2, 23, 11, 15, 4, 18, 1, 25, 22, 8, 7, 3, 20, 26, 10, 9, 12, 17, 14,
        16, 5,
    ],
    [
        15, 4, 6, 11, 26, 8, 7, 19, 24, 17, 1, 16, 3, 20, 22, 10, 2, 21, 18, 14, 25, 23, 9, 5, 13,
        12,
    ],
    [
        14, 12, 19, 18, 13, 22, 17, 21, 16, 11, 10, 2, 5, 1, 20, 9, 7, 4, 3, 15, 8, 6, 25, 26, 23,
        24,
    ],
];

/// Contact relabelling alphabet of the Nema wheels.
const NEMA_RELABEL_ALPHA: &str = "ijklmnopqrstuvwxyzabcdefgh";

/// Entry wheel of the Nema; the qwertzu runs counter clockwise against the
/// contact numbering.
const NEMA_PERM_ETW: &str = "qmnbvcxylkjhgfdsapoiuztrew";

/// Cam rings of the Nema drive wheels, indexed a-z. Rings 1 and 2 are
/// fixed in the machine, rings 12-23 are the selectable ones.
const NEMA_NOTCHES: [(u32, &str); 14] = [
    (100, "01000000010000000010000011"),
    (101, "01011001000000001000000000"),
    (102, "01111111111100011110111111"),
    (103, "11011110011011011101111110"),
    (104, "00101111011111111010010101"),
    (105, "10011010000010111111010111"),
    (106, "11111101111111101111111110"),
    (107, "01000001111000001010110110"),
    (108, "11111111111110101111111011"),
    (109, "11101111000111111111110111"),
    (110, "11111101110101010101101111"),
    (111, "10111011110111101110100100"),
    (112, "11001011001011011110011100"),
    (113, "10111111111101111111111110"),
];

// ---------------------------------------------------------------------------
// SG39
// ---------------------------------------------------------------------------

pub const SG39_ROTOR_0: u32 = 0;
pub const ID_SG39_UKW: u32 = 100;

/// Default reflector wiring of the SG39 as letter pairs.
pub const SG39_DEFAULT_UKW_PAIRS: &str = "awbicvdketfmgnhzjulopqrysx";

/// Input and output offsets used to derive the ten SG39 wheel wirings from
/// the base stock. The historical SG39 wirings never became public; the
/// simulator ships a fixed set of its own, like the original does.
const SG39_IN_OFFSETS: [usize; 10] = [3, 7, 11, 15, 19, 5, 9, 13, 17, 21];
const SG39_OUT_OFFSETS: [usize; 10] = [17, 3, 21, 9, 25, 11, 5, 23, 15, 7];

// ---------------------------------------------------------------------------
// Set builders
// ---------------------------------------------------------------------------

fn perm_from_str(alphabet: &str, spec: &str) -> Vec<usize> {
    // The embedded tables are compile time constants; a malformed entry is
    // a programming error, not an input error.
    Permutation::from_string(alphabet, spec)
        .map(|p| p.to_int_vector())
        .unwrap_or_else(|_| panic!("embedded wiring '{}' is not a permutation", spec))
}

fn ring_from_notches(notches: &str, size: usize) -> Vec<u8> {
    let mut ring = vec![0u8; size];

    for c in notches.chars() {
        let idx = (c as u8 - b'a') as usize;
        ring[idx] = 1;
    }

    ring
}

fn ring_from_bits(bits: &str) -> Vec<u8> {
    bits.chars().map(|c| if c == '1' { 1 } else { 0 }).collect()
}

fn entry26(perm: &str, notches: &str, name: &str) -> RotorEntry {
    RotorEntry {
        permutation: perm_from_str(STD_ALPHA, perm),
        ring_data: ring_from_notches(notches, 26),
        display_name: name.to_string(),
    }
}

/// Builds the default rotor set of the Enigma family, including the Typex
/// SP 02390 wheels which share the set in the original implementation.
pub fn enigma_rotor_set() -> RotorSet {
    let mut set = RotorSet::new("defaultset");

    let wheels: [(u32, &str, &str, &str); 46] = [
        (WALZE_I, PERM_I, NOTCH_I, "WALZE_I"),
        (WALZE_II, PERM_II, NOTCH_II, "WALZE_II"),
        (WALZE_III, PERM_III, NOTCH_III, "WALZE_III"),
        (WALZE_IV, PERM_IV, NOTCH_IV, "WALZE_IV"),
        (WALZE_V, PERM_V, NOTCH_V, "WALZE_V"),
        (WALZE_VI, PERM_VI, NOTCH_VI, "WALZE_VI"),
        (WALZE_VII, PERM_VII, NOTCH_VII, "WALZE_VII"),
        (WALZE_VIII, PERM_VIII, NOTCH_VIII, "WALZE_VIII"),
        (WALZE_ABW_I, PERM_ABW_I, NOTCH_ABW_I, "WALZE_ABW_I"),
        (WALZE_ABW_II, PERM_ABW_II, NOTCH_ABW_II, "WALZE_ABW_II"),
        (WALZE_ABW_III, PERM_ABW_III, NOTCH_ABW_III, "WALZE_ABW_III"),
        (WALZE_ABW_ETW, PERM_ABW_ETW, NOTCH_EMPTY, "WALZE_ABW_ETW"),
        (WALZE_RB_I, PERM_RB_I, NOTCH_RB_I, "WALZE_RB_I"),
        (WALZE_RB_II, PERM_RB_II, NOTCH_RB_II, "WALZE_RB_II"),
        (WALZE_RB_III, PERM_RB_III, NOTCH_RB_III, "WALZE_RB_III"),
        (WALZE_RB_ETW, PERM_RB_ETW, NOTCH_EMPTY, "WALZE_RB_ETW"),
        (WALZE_T_I, PERM_T_I, NOTCH_T_I, "WALZE_T_I"),
        (WALZE_T_II, PERM_T_II, NOTCH_T_II, "WALZE_T_II"),
        (WALZE_T_III, PERM_T_III, NOTCH_T_III, "WALZE_T_III"),
        (WALZE_T_IV, PERM_T_IV, NOTCH_T_IV, "WALZE_T_IV"),
        (WALZE_T_V, PERM_T_V, NOTCH_T_V, "WALZE_T_V"),
        (WALZE_T_VI, PERM_T_VI, NOTCH_T_VI, "WALZE_T_VI"),
        (WALZE_T_VII, PERM_T_VII, NOTCH_T_VII, "WALZE_T_VII"),
        (WALZE_T_VIII, PERM_T_VIII, NOTCH_T_VIII, "WALZE_T_VIII"),
        (WALZE_T_ETW, PERM_T_ETW, NOTCH_EMPTY, "WALZE_T_ETW"),
        (TYPEX_SP_02390_A, PERM_SP_02390_A, NOTCH_TYPEX, "TYPEX_SP_02390_A"),
        (TYPEX_SP_02390_B, PERM_SP_02390_B, NOTCH_TYPEX, "TYPEX_SP_02390_B"),
        (TYPEX_SP_02390_C, PERM_SP_02390_C, NOTCH_TYPEX, "TYPEX_SP_02390_C"),
        (TYPEX_SP_02390_D, PERM_SP_02390_D, NOTCH_TYPEX, "TYPEX_SP_02390_D"),
        (TYPEX_SP_02390_E, PERM_SP_02390_E, NOTCH_TYPEX, "TYPEX_SP_02390_E"),
        (TYPEX_SP_02390_F, PERM_SP_02390_F, NOTCH_TYPEX, "TYPEX_SP_02390_F"),
        (TYPEX_SP_02390_G, PERM_SP_02390_G, NOTCH_TYPEX, "TYPEX_SP_02390_G"),
        (TYPEX_ETW, PERM_TYPEX_ETW, NOTCH_EMPTY, "TYPEX_ETW"),
        (WALZE_KD_I, PERM_KD_I, NOTCH_KD, "WALZE_KD_I"),
        (WALZE_KD_II, PERM_KD_II, NOTCH_KD, "WALZE_KD_II"),
        (WALZE_KD_III, PERM_KD_III, NOTCH_KD, "WALZE_KD_III"),
        (WALZE_KD_IV, PERM_KD_IV, NOTCH_KD, "WALZE_KD_IV"),
        (WALZE_KD_V, PERM_KD_V, NOTCH_KD, "WALZE_KD_V"),
        (WALZE_KD_VI, PERM_KD_VI, NOTCH_KD, "WALZE_KD_VI"),
        (WALZE_KD_ETW, PERM_KD_ETW, NOTCH_EMPTY, "WALZE_KD_ETW"),
        (UKW_A, PERM_UKW_A, NOTCH_EMPTY, "UKW_A"),
        (UKW_B, PERM_UKW_B, NOTCH_EMPTY, "UKW_B"),
        (UKW_C, PERM_UKW_C, NOTCH_EMPTY, "UKW_C"),
        (UKW_D, PERM_UKW_D, NOTCH_EMPTY, "UKW_D"),
        (UKW_B_DN, PERM_UKW_B_DN, NOTCH_EMPTY, "UKW_B_DN"),
        (UKW_C_DN, PERM_UKW_C_DN, NOTCH_EMPTY, "UKW_C_DN"),
    ];

    for (id, perm, notches, name) in wheels {
        set.insert(id, entry26(perm, notches, name));
    }

    set.insert(UKW_ABW, entry26(PERM_ABW_UKW, NOTCH_EMPTY, "UKW_ABW"));
    set.insert(UKW_RB, entry26(PERM_RB_UKW, NOTCH_EMPTY, "UKW_RB"));
    set.insert(UKW_T, entry26(PERM_T_UKW, NOTCH_EMPTY, "UKW_T"));
    set.insert(WALZE_BETA, entry26(PERM_BETA, NOTCH_EMPTY, "WALZE_BETA"));
    set.insert(WALZE_GAMMA, entry26(PERM_GAMMA, NOTCH_EMPTY, "WALZE_GAMMA"));
    set.insert(
        TYPEX_SP_02390_UKW,
        entry26(PERM_SP_02390_UKW, NOTCH_EMPTY, "TYPEX_SP_02390_UKW"),
    );

    set
}

/// Builds the alternative Typex rotor set Y 269.
pub fn typex_y269_rotor_set() -> RotorSet {
    let mut set = RotorSet::new("Y269");

    let wheels: [(u32, &str, &str); 14] = [
        (TYPEX_Y_269_A, PERM_Y_269_A, "TYPEX_Y_269_A"),
        (TYPEX_Y_269_B, PERM_Y_269_B, "TYPEX_Y_269_B"),
        (TYPEX_Y_269_C, PERM_Y_269_C, "TYPEX_Y_269_C"),
        (TYPEX_Y_269_D, PERM_Y_269_D, "TYPEX_Y_269_D"),
        (TYPEX_Y_269_E, PERM_Y_269_E, "TYPEX_Y_269_E"),
        (TYPEX_Y_269_F, PERM_Y_269_F, "TYPEX_Y_269_F"),
        (TYPEX_Y_269_G, PERM_Y_269_G, "TYPEX_Y_269_G"),
        (TYPEX_Y_269_H, PERM_Y_269_H, "TYPEX_Y_269_H"),
        (TYPEX_Y_269_I, PERM_Y_269_I, "TYPEX_Y_269_I"),
        (TYPEX_Y_269_J, PERM_Y_269_J, "TYPEX_Y_269_J"),
        (TYPEX_Y_269_K, PERM_Y_269_K, "TYPEX_Y_269_K"),
        (TYPEX_Y_269_L, PERM_Y_269_L, "TYPEX_Y_269_L"),
        (TYPEX_Y_269_M, PERM_Y_269_M, "TYPEX_Y_269_M"),
        (TYPEX_Y_269_N, PERM_Y_269_N, "TYPEX_Y_269_N"),
    ];

    for (id, perm, name) in wheels {
        set.insert(id, entry26(perm, NOTCH_TYPEX, name));
    }

    set.insert(
        TYPEX_Y_269_UKW,
        entry26(PERM_Y_269_UKW, NOTCH_EMPTY, "TYPEX_Y_269_UKW"),
    );
    set.insert(TYPEX_ETW, entry26(PERM_TYPEX_ETW, NOTCH_EMPTY, "TYPEX_ETW"));

    set
}

/// Builds the SIGABA rotor set: ids 0-9 are the large rotors, ids 100-104
/// the ten-contact index rotors.
pub fn sigaba_rotor_set() -> RotorSet {
    let mut set = RotorSet::new("defaultset");

    for (i, wiring) in SIGABA_WIRINGS.iter().enumerate() {
        set.insert(
            i as u32,
            RotorEntry {
                permutation: perm_from_str(STD_ALPHA, wiring),
                ring_data: vec![0; 26],
                display_name: format!("SIGABA_ROTOR_{}", i),
            },
        );
    }

    for (i, wiring) in SIGABA_INDEX_WIRINGS.iter().enumerate() {
        set.insert(
            SIGABA_INDEX_0 + i as u32,
            RotorEntry {
                permutation: perm_from_str(SIGABA_INDEX_ALPHA, wiring),
                ring_data: vec![0; 10],
                display_name: format!("SIGABA_INDEX_{}", i),
            },
        );
    }

    set
}

/// Builds the KL7 rotor set: ids 0-12 are the rotors A-M, ids 100-110 the
/// notch rings 1-11 and id 111 the unnotched wide ring.
pub fn kl7_rotor_set() -> RotorSet {
    let mut set = RotorSet::new("defaultset");

    for (i, contacts) in KL7_ROTORS.iter().enumerate() {
        let permutation: Vec<usize> = contacts.iter().map(|&v| (v - 1) as usize).collect();
        set.insert(
            i as u32,
            RotorEntry {
                permutation,
                ring_data: vec![0; KL7_ROTOR_SIZE],
                display_name: format!("KL7_ROTOR_{}", (b'A' + i as u8) as char),
            },
        );
    }

    for ring in 0..11 {
        let bits: Vec<u8> = KL7_RING_COLS
            .iter()
            .map(|col| if col.as_bytes()[ring] == b'1' { 1 } else { 0 })
            .collect();
        set.insert(
            KL7_RING_1 + ring as u32,
            RotorEntry {
                permutation: (0..KL7_ROTOR_SIZE).collect(),
                ring_data: bits,
                display_name: format!("KL7_RING_{}", ring + 1),
            },
        );
    }

    set.insert(
        KL7_RING_WIDE,
        RotorEntry {
            permutation: (0..KL7_ROTOR_SIZE).collect(),
            ring_data: vec![0; KL7_ROTOR_SIZE],
            display_name: "KL7_RING_WIDE".to_string(),
        },
    );

    set
}

/// Builds the Nema rotor set: contact wheels A-F, reflector, entry wheel
/// and the drive wheel cam rings.
pub fn nema_rotor_set() -> RotorSet {
    let mut set = RotorSet::new("defaultset");
    let relabel: Vec<char> = NEMA_RELABEL_ALPHA.chars().collect();

    for (i, contacts) in NEMA_PERMS.iter().enumerate() {
        let symbols: String = contacts.iter().map(|&v| relabel[(v - 1) as usize]).collect();
        let name = if i == 6 {
            "NEMA_UKW".to_string()
        } else {
            format!("NEMA_ROTOR_{}", (b'A' + i as u8) as char)
        };
        set.insert(
            i as u32,
            RotorEntry {
                permutation: perm_from_str(STD_ALPHA, &symbols),
                ring_data: vec![0; 26],
                display_name: name,
            },
        );
    }

    set.insert(
        NEMA_ETW,
        RotorEntry {
            permutation: perm_from_str(STD_ALPHA, NEMA_PERM_ETW),
            ring_data: vec![0; 26],
            display_name: "NEMA_ETW".to_string(),
        },
    );

    for (id, bits) in NEMA_NOTCHES {
        let label = match id {
            100 => "NEMA_DRIVE_WHEEL_1".to_string(),
            101 => "NEMA_DRIVE_WHEEL_2".to_string(),
            _ => format!("NEMA_DRIVE_WHEEL_{}", id - 102 + 12),
        };
        set.insert(
            id,
            RotorEntry {
                permutation: (0..26).collect(),
                ring_data: ring_from_bits(bits),
                display_name: label,
            },
        );
    }

    set
}

/// Builds the SG39 rotor set: ten wheels plus the default reflector.
pub fn sg39_rotor_set() -> RotorSet {
    let mut set = RotorSet::new("defaultset");

    let base: [&str; 10] = [
        PERM_I, PERM_II, PERM_III, PERM_IV, PERM_V, PERM_VI, PERM_VII, PERM_VIII, PERM_BETA,
        PERM_GAMMA,
    ];

    for i in 0..10 {
        let stock = perm_from_str(STD_ALPHA, base[i]);
        let mut permutation = vec![0usize; 26];
        for (x, item) in permutation.iter_mut().enumerate() {
            *item = (stock[(x + SG39_IN_OFFSETS[i]) % 26] + SG39_OUT_OFFSETS[i]) % 26;
        }

        set.insert(
            i as u32,
            RotorEntry {
                permutation,
                ring_data: vec![0; 26],
                display_name: format!("SG39_WALZE_{}", i),
            },
        );
    }

    let ukw = Permutation::involution_from_pairs(STD_ALPHA, SG39_DEFAULT_UKW_PAIRS)
        .map(|p| p.to_int_vector())
        .unwrap_or_else(|_| panic!("embedded sg39 reflector is invalid"));

    set.insert(
        ID_SG39_UKW,
        RotorEntry {
            permutation: ukw,
            ring_data: vec![0; 26],
            display_name: "SG39_UKW".to_string(),
        },
    );

    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::permutation::Permutation;
    use crate::utils::STD_ALPHA;

    fn assert_all_bijections(set: &RotorSet) {
        for id in set.ids() {
            let entry = set.lookup(id).unwrap();
            let n = entry.permutation.len();
            let mut seen = vec![false; n];
            for &v in &entry.permutation {
                assert!(v < n && !seen[v], "{} is not a bijection", entry.display_name);
                seen[v] = true;
            }
            assert_eq!(entry.ring_data.len(), n);
        }
    }

    #[test]
    fn test_all_sets_are_valid() {
        assert_all_bijections(&enigma_rotor_set());
        assert_all_bijections(&typex_y269_rotor_set());
        assert_all_bijections(&sigaba_rotor_set());
        assert_all_bijections(&kl7_rotor_set());
        assert_all_bijections(&nema_rotor_set());
        assert_all_bijections(&sg39_rotor_set());
    }

    #[test]
    fn test_reflectors_are_involutions() {
        let set = enigma_rotor_set();
        for id in [UKW_A, UKW_B, UKW_C, UKW_B_DN, UKW_C_DN, UKW_ABW, UKW_RB, UKW_T] {
            let perm = Permutation::from_int_vector(
                STD_ALPHA,
                set.lookup(id).unwrap().permutation.clone(),
            )
            .unwrap();
            assert!(perm.is_involution());
            assert!(perm.has_no_fixpoint());
        }
    }

    #[test]
    fn test_walze_i_notch_at_q() {
        let set = enigma_rotor_set();
        let entry = set.lookup(WALZE_I).unwrap();
        assert_eq!(entry.ring_data[16], 1);
        assert_eq!(entry.ring_data.iter().filter(|&&v| v == 1).count(), 1);
    }

    #[test]
    fn test_kl7_ring_transposition() {
        let set = kl7_rotor_set();
        // ring 1 is the first column: positions 0, 4, 9, 13, 14, ...
        let ring1 = &set.lookup(KL7_RING_1).unwrap().ring_data;
        assert_eq!(ring1[0], 1);
        assert_eq!(ring1[1], 0);
        assert_eq!(ring1[4], 1);
        assert_eq!(ring1[35], 1);
    }
}
