//! Embedded fleet sample used when no dataset is configured.

/// Thirty days of fleet events across eight tails and three software versions.
pub const SAMPLE_CSV: &str = "\
date,tail,sw_version,aid_count,fault_code,humidity,ata_chapter,flight_hours,oat,airport
2025-10-16,N101,v1.9,0,FC100,40,31,12.4,22,KATL
2025-10-17,N102,v2.0,1,FC200,60,31,8.2,25,KJFK
2025-10-18,N103,v1.9,0,FC100,35,31,11.0,20,KLAX
2025-10-19,N104,v2.0,0,FC300,55,32,9.5,18,KORD
2025-10-20,N105,v2.1,2,FC100,78,31,13.2,30,KSFO
2025-10-21,N106,v1.9,0,FC200,45,31,10.1,19,KMIA
2025-10-22,N107,v2.1,1,FC300,82,31,14.3,31,KSEA
2025-10-23,N108,v1.9,0,FC100,38,31,7.6,21,KBOS
2025-10-24,N101,v2.1,2,FC200,85,31,12.9,33,KATL
2025-10-25,N102,v2.1,3,FC100,80,31,9.9,32,KJFK
2025-10-26,N103,v1.9,0,FC300,30,32,11.5,16,KLAX
2025-10-27,N104,v2.0,1,FC200,65,31,8.8,24,KORD
2025-10-28,N105,v2.1,2,FC100,75,31,13.5,29,KSFO
2025-10-29,N106,v1.9,0,FC400,42,31,10.7,20,KMIA
2025-10-30,N107,v2.1,1,FC100,70,31,14.0,28,KSEA
2025-10-31,N108,v1.9,0,FC200,50,32,7.9,23,KBOS
2025-11-01,N101,v2.1,4,FC100,88,31,13.6,34,KATL
2025-11-02,N102,v2.1,2,FC200,82,31,9.7,31,KJFK
2025-11-03,N103,v1.9,0,FC300,43,31,11.2,19,KLAX
2025-11-04,N104,v2.0,1,FC100,60,31,9.1,22,KORD
2025-11-05,N105,v2.1,5,FC100,90,31,13.8,35,KSFO
2025-11-06,N106,v1.9,0,FC200,37,31,10.5,18,KMIA
2025-11-07,N107,v2.1,1,FC300,68,31,14.2,27,KSEA
2025-11-08,N108,v1.9,0,FC100,44,31,8.1,21,KBOS
2025-11-09,N101,v2.1,2,FC200,79,31,12.5,30,KATL
2025-11-10,N102,v2.1,1,FC100,83,31,9.6,32,KJFK
2025-11-11,N103,v1.9,0,FC400,39,32,11.0,17,KLAX
2025-11-12,N104,v2.0,0,FC200,58,31,9.3,24,KORD
2025-11-13,N105,v2.1,3,FC100,86,31,13.1,33,KSFO
2025-11-14,N106,v1.9,0,FC300,48,31,10.4,20,KMIA
";
