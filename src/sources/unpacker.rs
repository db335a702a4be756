use std::collections::HashMap;

use regex::Regex;

/// Decodes Dean Edwards p.a.c.k.e.d eval blobs, the script obfuscation most
/// of these hosting services ship their player setup in.
///
/// Returns `None` when the input is not packed or the blob is malformed.
pub fn unpack(code: &str) -> Option<String> {
    if !code.contains("eval(function(p,a,c,k,e,d)") {
        return None;
    }

    let args_re = Regex::new(r"\}\('(.+)',(\d+),(\d+),'([^']*)'\.split\('\|'\)").ok()?;
    let caps = args_re.captures(code)?;

    let payload = &caps[1];
    let base: u64 = caps[2].parse().ok()?;
    let count: usize = caps[3].parse().ok()?;
    let words: Vec<&str> = caps[4].split('|').collect();

    if base < 2 || base > 62 {
        return None;
    }

    let mut dictionary: HashMap<String, &str> = HashMap::with_capacity(count);
    for index in (0..count).rev() {
        if let Some(word) = words.get(index) {
            if !word.is_empty() {
                dictionary.insert(symbol(index as u64, base), word);
            }
        }
    }

    let word_re = Regex::new(r"\b\w+\b").ok()?;
    let unpacked = word_re.replace_all(payload, |caps: &regex::Captures| {
        dictionary
            .get(&caps[0])
            .map(|w| w.to_string())
            .unwrap_or_else(|| caps[0].to_string())
    });

    Some(unpacked.into_owned())
}

/// The packer's index-to-identifier encoding: base-36 digits for 0..=35,
/// single chars from '@' upwards beyond that.
fn symbol(index: u64, base: u64) -> String {
    let mut out = String::new();
    encode_into(index, base, &mut out);
    out
}

fn encode_into(value: u64, base: u64, out: &mut String) {
    if value >= base {
        encode_into(value / base, base, out);
    }
    let digit = value % base;
    if digit > 35 {
        out.push((digit as u8 + 29) as char);
    } else {
        out.push(char::from_digit(digit as u32, 36).unwrap_or('0'));
    }
}
