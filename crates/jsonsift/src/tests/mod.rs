mod extract_bad;
